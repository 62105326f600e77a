//! Prompt templates for shortsmith.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;

/// `{{name}}` placeholders.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"));

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub analysis: AnalysisPrompts,
    pub metadata: MetadataPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompt for picking highlight segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPrompts {
    pub user: String,
}

impl Default for AnalysisPrompts {
    fn default() -> Self {
        Self {
            user: r#"Analyze the following video and pick the {{max_segments}} most interesting moments that would work as standalone shorts.

Title: {{title}}
Duration: {{duration}} seconds
Transcript: {{transcript}}...

Return the result as JSON with the following structure:
{
  "segments": [
    {
      "start_time": 0,
      "end_time": 60,
      "description": "What happens in this segment",
      "relevance_score": 0.9
    }
  ]
}

Requirements:
- Each segment must be between {{min_duration}} and {{max_duration}} seconds long
- Pick the most engaging fragments that make sense on their own
- Segments must not overlap
- Rate relevance from 0 to 1"#
                .to_string(),
        }
    }
}

/// Prompt for short titles and descriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataPrompts {
    pub user: String,
}

impl Default for MetadataPrompts {
    fn default() -> Self {
        Self {
            user: r#"Write a catchy title and description for a short video clip.

Source video: {{title}}
Fragment: {{description}}
Time: {{start}}-{{end}} seconds

Answer in exactly this format:
Title: [short catchy title]
Description: [brief description, up to 100 characters]"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let analysis_path = custom_path.join("analysis.toml");
            if analysis_path.exists() {
                let content = std::fs::read_to_string(&analysis_path)?;
                prompts.analysis = toml::from_str(&content)?;
            }

            let metadata_path = custom_path.join("metadata.toml");
            if metadata_path.exists() {
                let content = std::fs::read_to_string(&metadata_path)?;
                prompts.metadata = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables in a single pass.
    ///
    /// Substituted values are never rescanned; unknown placeholders are left as-is.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.analysis.user.contains("{{transcript}}"));
        assert!(prompts.metadata.user.contains("Title:"));
        assert!(prompts.metadata.user.contains("Description:"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_expand_substituted_values() {
        let template = "Title: {{title}}\nDuration: {{duration}}\nTranscript: {{transcript}} {{unknown}}";
        let mut vars = HashMap::new();
        vars.insert("title".to_string(), "Why {{duration}} matters".to_string());
        vars.insert("duration".to_string(), "125".to_string());
        vars.insert("transcript".to_string(), "she said {{title}} twice".to_string());

        assert_eq!(
            Prompts::render(template, &vars),
            "Title: Why {{duration}} matters\nDuration: 125\nTranscript: she said {{title}} twice {{unknown}}"
        );
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("channel".to_string(), "Default".to_string());
        prompts.variables.insert("title".to_string(), "Config title".to_string());

        let mut vars = HashMap::new();
        vars.insert("title".to_string(), "Call title".to_string());

        let rendered = prompts.render_with_custom("{{title}} on {{channel}}", &vars);
        assert_eq!(rendered, "Call title on Default");
    }

    #[test]
    fn test_load_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("metadata.toml"), "user = \"Name it: {{title}}\"").unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.metadata.user, "Name it: {{title}}");
        assert!(prompts.analysis.user.contains("{{transcript}}"));
    }
}
