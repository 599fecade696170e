//! Ready-made agents: python, csv, the router over both, and search
//!
//! Each constructor takes the shared LLM client and the loaded config, so
//! tests can pass a `MockLlmClient` and a default `Config`.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use serde_json::json;

use super::{Agent, AgentTool, ToolCallingAgent};
use crate::config::{Config, Credentials};
use crate::error::{AgentError, Result};
use crate::llm::LlmClient;
use crate::prompt::PromptRenderer;
use crate::tools::{MultiplyTool, PythonReplTool, ToolSet, WebSearchTool};

pub const PYTHON_AGENT_INSTRUCTIONS: &str = "\
You are an agent designed to write and execute python code to answer questions.
You have access to a python REPL, which you can use to execute python code.
If you get an error, debug your code and try again.
Only use the output of your code to answer the question.
You might know the answer without running any code, but you should still run the code to get the answer.
If it does not seem like you can write code to answer the question, just return \"I don't know\" as the answer.";

pub const PYTHON_TOOL_NAME: &str = "python_agent";
pub const CSV_TOOL_NAME: &str = "csv_agent";

/// Request run when the CLI is invoked without a command
pub const DEMO_REQUEST: &str =
    "generate and save in current working directory a QR code that point to https://github.com/ndkhoa211";

/// Agent that answers by writing and running Python
pub fn python_agent(llm: Arc<dyn LlmClient>, config: &Config) -> Result<ToolCallingAgent> {
    let tools = ToolSet::new().with(Arc::new(PythonReplTool::new(&config.python)))?;

    Ok(ToolCallingAgent::new("python", llm, tools)
        .with_instructions(PYTHON_AGENT_INSTRUCTIONS)
        .with_config(config.agent.clone()))
}

/// Agent that answers questions about one CSV file with pandas
///
/// The file is read once here for the prompt preview; a missing file fails
/// construction.
pub fn csv_agent(llm: Arc<dyn LlmClient>, config: &Config, path: &Path) -> Result<ToolCallingAgent> {
    let preview = csv_preview(path, config.csv.preview_rows)?;
    let absolute = std::path::absolute(path)?;
    let literal = serde_json::to_string(&absolute.to_string_lossy())?;

    let preamble = format!("import pandas as pd\ndf = pd.read_csv({})", literal);
    let python = PythonReplTool::new(&config.python).with_preamble(preamble);
    let tools = ToolSet::new().with(Arc::new(python))?;

    let instructions = PromptRenderer::new().render_named(
        "csv_instructions",
        &json!({
            "path": path.display().to_string(),
            "rows": preview.lines().count(),
            "preview": preview,
        }),
    )?;

    info!("csv agent over {}", absolute.display());
    Ok(ToolCallingAgent::new("csv", llm, tools)
        .with_instructions(instructions)
        .with_config(config.agent.clone()))
}

/// Header plus the first `rows` data lines of a CSV file
pub fn csv_preview(path: &Path, rows: usize) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AgentError::Config(format!("Failed to read CSV file {}: {}", path.display(), e)))?;

    let preview: Vec<&str> = content.lines().take(rows + 1).collect();
    debug!("csv preview of {}: {} lines", path.display(), preview.len());
    Ok(preview.join("\n"))
}

/// Names and descriptions of the router's tools, in registration order
pub fn router_tool_descriptions(csv_path: &Path) -> Vec<(&'static str, String)> {
    let file_name = csv_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| csv_path.display().to_string());

    vec![
        (
            PYTHON_TOOL_NAME,
            "useful when you need to transform natural language to python and execute the python code, \
             returning the results in the code execution. DOES NOT ACCEPT CODE AS INPUT"
                .to_string(),
        ),
        (
            CSV_TOOL_NAME,
            format!(
                "useful when you need to answer question over {} file, takes an input the entire question \
                 and return the answer after running pandas calculations",
                file_name
            ),
        ),
    ]
}

/// Router whose only tools are the python and csv agents
pub fn router_agent(llm: Arc<dyn LlmClient>, config: &Config, csv_path: &Path) -> Result<ToolCallingAgent> {
    let agents: [Arc<dyn Agent>; 2] = [
        Arc::new(python_agent(llm.clone(), config)?),
        Arc::new(csv_agent(llm.clone(), config, csv_path)?),
    ];

    let mut tools = ToolSet::new();
    for (agent, (name, description)) in agents.into_iter().zip(router_tool_descriptions(csv_path)) {
        tools.register(Arc::new(AgentTool::new(agent, name, description)))?;
    }

    Ok(ToolCallingAgent::new("router", llm, tools).with_config(config.agent.clone()))
}

/// Agent with web search and multiplication
pub fn search_agent(llm: Arc<dyn LlmClient>, config: &Config, credentials: &Credentials) -> Result<ToolCallingAgent> {
    let search = WebSearchTool::new(credentials.tavily_api_key()?, &config.search)?;
    let tools = ToolSet::new()
        .with(Arc::new(search))?
        .with(Arc::new(MultiplyTool))?;

    Ok(ToolCallingAgent::new("search", llm, tools).with_config(config.agent.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentRequest;
    use crate::llm::{CompletionResponse, MockLlmClient, ToolCall};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn episodes_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Season,No. in Season,Title,Written by").unwrap();
        for i in 1..=8 {
            writeln!(file, "1,{},Episode {},Larry David", i, i).unwrap();
        }
        file
    }

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.agent.verbose = false;
        config
    }

    #[test]
    fn test_csv_preview_takes_header_and_rows() {
        let file = episodes_csv();
        let preview = csv_preview(file.path(), 2).unwrap();
        assert_eq!(
            preview,
            "Season,No. in Season,Title,Written by\n1,1,Episode 1,Larry David\n1,2,Episode 2,Larry David"
        );
    }

    #[test]
    fn test_csv_missing_file_is_fatal() {
        let mock = Arc::new(MockLlmClient::default());
        let result = csv_agent(mock, &quiet_config(), Path::new("/nonexistent/episode_info.csv"));
        assert!(matches!(result, Err(AgentError::Config(msg)) if msg.contains("episode_info.csv")));
    }

    #[test]
    fn test_csv_agent_prompt_mentions_dataframe() {
        let file = episodes_csv();
        let agent = csv_agent(Arc::new(MockLlmClient::default()), &quiet_config(), file.path()).unwrap();

        let prompt = agent.system_prompt().unwrap();
        assert!(prompt.contains("The name of the dataframe is `df`"));
        assert!(prompt.contains("1,1,Episode 1,Larry David"));
        assert!(!prompt.contains("Episode 8"));
        assert_eq!(agent.tools().names(), vec!["python_repl"]);
    }

    #[test]
    fn test_python_agent_tools() {
        let agent = python_agent(Arc::new(MockLlmClient::default()), &quiet_config()).unwrap();
        assert_eq!(agent.tools().names(), vec!["python_repl"]);
        assert!(agent.system_prompt().unwrap().contains("I don't know"));
    }

    #[test]
    fn test_router_tools_are_distinct_adapters() {
        let file = episodes_csv();
        let router = router_agent(Arc::new(MockLlmClient::default()), &quiet_config(), file.path()).unwrap();

        assert_eq!(router.tools().names(), vec![PYTHON_TOOL_NAME, CSV_TOOL_NAME]);
        let prompt = router.system_prompt().unwrap();
        assert!(prompt.starts_with("Answer the following request"));
        assert!(prompt.contains("DOES NOT ACCEPT CODE AS INPUT"));
    }

    #[test]
    fn test_router_descriptions_name_the_file() {
        let descriptions = router_tool_descriptions(Path::new("data/episode_info.csv"));
        assert_eq!(descriptions.len(), 2);
        assert!(descriptions[1].1.contains("over episode_info.csv file"));
    }

    #[test]
    fn test_search_agent_requires_tavily_key() {
        let result = search_agent(Arc::new(MockLlmClient::default()), &quiet_config(), &Credentials::default());
        assert!(matches!(result, Err(AgentError::MissingCredential(_))));

        let credentials = Credentials {
            tavily_api_key: Some("tvly-test".to_string()),
            ..Default::default()
        };
        let agent = search_agent(Arc::new(MockLlmClient::default()), &quiet_config(), &credentials).unwrap();
        assert_eq!(agent.tools().names(), vec!["web_search", "multiply"]);
    }

    #[tokio::test]
    async fn test_search_agent_multiplies_without_network() {
        let credentials = Credentials {
            tavily_api_key: Some("tvly-test".to_string()),
            ..Default::default()
        };
        let mock = Arc::new(MockLlmClient::new(vec![
            CompletionResponse::tool_use("", vec![ToolCall::new("c1", "multiply", json!({"a": 6, "b": 7}))]),
            CompletionResponse::text("42"),
        ]));
        let agent = search_agent(mock, &quiet_config(), &credentials).unwrap();

        let response = agent.invoke(AgentRequest::new("what is 6 times 7?")).await.unwrap();
        assert_eq!(response.output.primary_text().unwrap(), "42");
    }
}
