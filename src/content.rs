use crate::config::{ContentConfig, ContentSourceType};
use crate::error::ContentError;
use crate::model::CategorySource;
use serde::{Deserialize, Serialize};

fn default_image() -> String {
    "https://placehold.co/400".to_string()
}

/// One entry of the categories manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub name: String,
    pub description: String,
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default)]
    pub source: CategorySource,
}

/// One entry of a per-category question file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub text: String,
    pub answers: Vec<String>,
    pub correct_answer: usize,
}

pub struct ContentParser;

impl ContentParser {
    #[tracing::instrument(skip(content), fields(content.length = content.len()))]
    pub fn parse_categories_manifest(content: &str) -> Result<Vec<CategoryRecord>, ContentError> {
        serde_json::from_str(content)
            .map_err(|e| ContentError::Parse(format!("Invalid categories manifest: {}", e)))
    }

    #[tracing::instrument(skip(content), fields(content.length = content.len()))]
    pub fn parse_question_file(content: &str) -> Result<Vec<QuestionRecord>, ContentError> {
        serde_json::from_str(content)
            .map_err(|e| ContentError::Parse(format!("Invalid question file: {}", e)))
    }
}

/// Loads the categories manifest and per-category question files from the
/// configured source (local files or an HTTP base).
#[derive(Clone)]
pub struct ContentLoader {
    config: ContentConfig,
}

impl ContentLoader {
    pub fn new(config: ContentConfig) -> Self {
        Self { config }
    }

    #[tracing::instrument(skip(self), fields(data.source_type = ?self.config.source_type))]
    pub async fn load_categories(&self) -> Result<Vec<CategoryRecord>, ContentError> {
        let raw = match self.config.source_type {
            ContentSourceType::File => {
                let path = self.config.categories_path.as_ref().ok_or_else(|| {
                    ContentError::Config(
                        "categories_path required for file content source".to_string(),
                    )
                })?;
                read_file(path).await?
            }
            ContentSourceType::Http => {
                let url = self.config.categories_url.as_ref().ok_or_else(|| {
                    ContentError::Config(
                        "categories_url required for http content source".to_string(),
                    )
                })?;
                fetch_url(url).await?
            }
        };

        let records = ContentParser::parse_categories_manifest(&raw)?;
        tracing::info!(categories.count = records.len(), "Loaded categories manifest");
        Ok(records)
    }

    /// Loads the question file for one category, addressed by category name.
    #[tracing::instrument(skip(self), fields(category.name = %category_name))]
    pub async fn load_questions(
        &self,
        category_name: &str,
    ) -> Result<Vec<QuestionRecord>, ContentError> {
        let raw = match self.config.source_type {
            ContentSourceType::File => {
                let dir = self.config.questions_dir.as_ref().ok_or_else(|| {
                    ContentError::Config(
                        "questions_dir required for file content source".to_string(),
                    )
                })?;
                read_file(&format!("{}/{}.json", dir, category_name)).await?
            }
            ContentSourceType::Http => {
                let base = self.config.questions_base_url.as_ref().ok_or_else(|| {
                    ContentError::Config(
                        "questions_base_url required for http content source".to_string(),
                    )
                })?;
                fetch_url(&format!("{}/{}.json", base, category_name)).await?
            }
        };

        let records = ContentParser::parse_question_file(&raw)?;
        tracing::debug!(
            questions.count = records.len(),
            "Loaded question file"
        );
        Ok(records)
    }
}

async fn read_file(path: &str) -> Result<String, ContentError> {
    tracing::debug!(file.path = %path, "Loading content from file");
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ContentError::FileRead {
            path: path.to_string(),
            source: e,
        })
}

async fn fetch_url(url: &str) -> Result<String, ContentError> {
    tracing::debug!(http.url = %url, "Fetching content from URL");
    let response = reqwest::get(url).await.map_err(|e| ContentError::HttpFetch {
        url: url.to_string(),
        source: e,
    })?;

    response.text().await.map_err(|e| ContentError::HttpFetch {
        url: url.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_categories_manifest_with_defaults() {
        let content = r#"[
            {
                "name": "History",
                "description": "Questions about the past",
                "image": "/images/history.png",
                "source": "external"
            },
            {
                "name": "Math",
                "description": "Numbers and such"
            }
        ]"#;

        let records = ContentParser::parse_categories_manifest(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "History");
        assert_eq!(records[0].source, CategorySource::External);
        assert_eq!(records[1].image, "https://placehold.co/400");
        assert_eq!(records[1].source, CategorySource::Internal);
    }

    #[test]
    fn test_parse_question_file() {
        let content = r#"[
            {
                "text": "What is 2+2?",
                "answers": ["3", "4", "5", "6"],
                "correctAnswer": 1
            }
        ]"#;

        let records = ContentParser::parse_question_file(content).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "What is 2+2?");
        assert_eq!(records[0].answers.len(), 4);
        assert_eq!(records[0].correct_answer, 1);
    }

    #[test]
    fn test_parse_rejects_malformed_manifest() {
        assert!(ContentParser::parse_categories_manifest("{not json").is_err());
    }

    #[tokio::test]
    async fn test_load_questions_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Math.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[{{"text": "q", "answers": ["a", "b", "c", "d"], "correctAnswer": 0}}]"#
        )
        .unwrap();

        let loader = ContentLoader::new(ContentConfig {
            source_type: ContentSourceType::File,
            categories_path: None,
            categories_url: None,
            questions_dir: Some(dir.path().to_string_lossy().to_string()),
            questions_base_url: None,
        });

        let records = loader.load_questions("Math").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "q");
    }

    #[tokio::test]
    async fn test_load_questions_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ContentLoader::new(ContentConfig {
            source_type: ContentSourceType::File,
            categories_path: None,
            categories_url: None,
            questions_dir: Some(dir.path().to_string_lossy().to_string()),
            questions_base_url: None,
        });

        assert!(matches!(
            loader.load_questions("nope").await,
            Err(ContentError::FileRead { .. })
        ));
    }
}
