use crate::content::ContentLoader;
use crate::engine::QuizEngine;
use crate::error::ContentError;
use crate::model::{Category, CategorySource};
use async_trait::async_trait;

/// Strategy seam for filling an empty category with questions. Population
/// failures stay inside the strategy: a source that produced nothing leaves
/// the category empty, which callers observe as the terminal "no question"
/// signal, never as an error.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn populate(&self, category: &mut Category);
}

/// Loads questions from the per-category question files.
pub struct LocalQuestionSource {
    loader: ContentLoader,
}

impl LocalQuestionSource {
    pub fn new(loader: ContentLoader) -> Self {
        Self { loader }
    }
}

#[async_trait]
impl QuestionSource for LocalQuestionSource {
    async fn populate(&self, category: &mut Category) {
        match self.loader.load_questions(&category.name).await {
            Ok(records) => {
                for record in records {
                    category.add_question(&record.text, record.answers, record.correct_answer);
                }
                tracing::info!(
                    category.name = %category.name,
                    questions.count = category.questions.len(),
                    "Populated category from local questions"
                );
            }
            Err(e) => {
                tracing::error!(
                    category.name = %category.name,
                    error = %e,
                    "Failed to load local questions, category stays empty"
                );
            }
        }
    }
}

/// Populates a category from the remote quiz engine via answer discovery.
pub struct EngineQuestionSource {
    engine: QuizEngine,
}

impl EngineQuestionSource {
    pub fn new(engine: QuizEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl QuestionSource for EngineQuestionSource {
    async fn populate(&self, category: &mut Category) {
        match self.engine.get_all_questions().await {
            Some(resolved) => {
                for question in resolved {
                    category.add_question(
                        &question.text,
                        question.answers,
                        question.correct_answer,
                    );
                }
                tracing::info!(
                    category.name = %category.name,
                    questions.count = category.questions.len(),
                    "Populated category from quiz engine"
                );
            }
            None => {
                tracing::error!(
                    category.name = %category.name,
                    "Quiz engine unreachable, category stays empty"
                );
            }
        }
    }
}

/// Owns the set of categories (unique by name) and the active selection.
/// The active category is addressed by name so it always refers to a member
/// of the set; removing that member clears the selection.
pub struct CategoryStore {
    loader: ContentLoader,
    internal_source: Box<dyn QuestionSource>,
    external_source: Option<Box<dyn QuestionSource>>,
    categories: Vec<Category>,
    active: Option<String>,
}

impl CategoryStore {
    pub fn new(loader: ContentLoader) -> Self {
        let internal_source: Box<dyn QuestionSource> =
            Box::new(LocalQuestionSource::new(loader.clone()));
        Self {
            loader,
            internal_source,
            external_source: None,
            categories: Vec::new(),
            active: None,
        }
    }

    /// Enables population of `external` categories through the quiz engine.
    /// Without this, selecting an external category is a logged no-op.
    pub fn with_engine(mut self, engine: QuizEngine) -> Self {
        self.external_source = Some(Box::new(EngineQuestionSource::new(engine)));
        self
    }

    pub fn set_internal_source(&mut self, source: Box<dyn QuestionSource>) {
        self.internal_source = source;
    }

    pub fn set_external_source(&mut self, source: Box<dyn QuestionSource>) {
        self.external_source = Some(source);
    }

    /// Makes the named category active and populates it if it has no
    /// questions yet. An unknown name is logged and leaves the current
    /// selection untouched.
    #[tracing::instrument(skip(self))]
    pub async fn select_category(&mut self, name: &str) {
        let Some(index) = self.categories.iter().position(|c| c.name == name) else {
            tracing::error!(category.name = %name, "Category not found");
            return;
        };

        self.active = Some(name.to_string());
        if self.categories[index].questions.is_empty() {
            self.populate_category(index).await;
        }
    }

    async fn populate_category(&mut self, index: usize) {
        match self.categories[index].source {
            CategorySource::Internal => {
                self.internal_source
                    .populate(&mut self.categories[index])
                    .await;
            }
            CategorySource::External => match &self.external_source {
                Some(source) => source.populate(&mut self.categories[index]).await,
                None => {
                    tracing::warn!(
                        category.name = %self.categories[index].name,
                        "External question source not configured"
                    );
                }
            },
        }
    }

    /// Loads the category manifest if no categories are present yet.
    pub async fn update_categories(&mut self) -> Result<(), ContentError> {
        if self.categories.is_empty() {
            self.force_update_categories().await?;
        }
        Ok(())
    }

    /// Reloads the category manifest unconditionally. The replacement list
    /// is built completely before it is swapped in, so readers never see a
    /// half-built set. The active selection survives only if a category of
    /// the same name is in the new manifest.
    #[tracing::instrument(skip(self))]
    pub async fn force_update_categories(&mut self) -> Result<(), ContentError> {
        let records = self.loader.load_categories().await?;
        let categories: Vec<Category> = records
            .into_iter()
            .map(|r| Category::new(r.name, r.description, r.image, r.source))
            .collect();

        if let Some(active) = &self.active {
            if !categories.iter().any(|c| &c.name == active) {
                tracing::info!(
                    category.name = %active,
                    "Active category gone after reload, clearing selection"
                );
                self.active = None;
            }
        }

        tracing::info!(categories.count = categories.len(), "Categories replaced");
        self.categories = categories;
        Ok(())
    }

    /// Adds a category. Names are unique within the store; a duplicate is
    /// logged and skipped.
    pub fn add_category(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
        source: CategorySource,
    ) {
        let name = name.into();
        if self.find_category(&name).is_some() {
            tracing::warn!(category.name = %name, "Duplicate category name, skipping");
            return;
        }
        self.categories
            .push(Category::new(name, description, image, source));
    }

    /// Removes a category by name; missing names are a no-op. Removing the
    /// active category clears the selection.
    pub fn remove_category(&mut self, name: &str) {
        let Some(index) = self.categories.iter().position(|c| c.name == name) else {
            return;
        };
        self.categories.remove(index);
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
    }

    pub fn empty_categories(&mut self) {
        self.categories.clear();
        self.active = None;
    }

    pub fn find_category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn find_category_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.name == name)
    }

    pub fn get_categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn active_category(&self) -> Option<&Category> {
        let name = self.active.as_deref()?;
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn active_category_mut(&mut self) -> Option<&mut Category> {
        let name = self.active.clone()?;
        self.categories.iter_mut().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContentConfig, ContentSourceType};
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn loader_for_dir(dir: &std::path::Path) -> ContentLoader {
        ContentLoader::new(ContentConfig {
            source_type: ContentSourceType::File,
            categories_path: Some(
                dir.join("categories.json").to_string_lossy().to_string(),
            ),
            categories_url: None,
            questions_dir: Some(dir.to_string_lossy().to_string()),
            questions_base_url: None,
        })
    }

    fn empty_store() -> CategoryStore {
        let dir = tempfile::tempdir().unwrap();
        CategoryStore::new(loader_for_dir(dir.path()))
    }

    /// Adds a fixed question to every category it populates and counts calls.
    struct StubSource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl QuestionSource for StubSource {
        async fn populate(&self, category: &mut Category) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            category.add_question(
                "stub question",
                vec!["a".into(), "b".into(), "c".into(), "d".into()],
                0,
            );
        }
    }

    #[tokio::test]
    async fn test_select_missing_category_leaves_active_unchanged() {
        let mut store = empty_store();
        store.add_category("Math", "numbers", "", CategorySource::Internal);
        store.set_internal_source(Box::new(StubSource {
            calls: Arc::new(AtomicUsize::new(0)),
        }));

        store.select_category("Math").await;
        assert_eq!(store.active_category().unwrap().name, "Math");

        store.select_category("missing").await;
        assert_eq!(store.active_category().unwrap().name, "Math");
    }

    #[tokio::test]
    async fn test_select_populates_empty_category_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut store = empty_store();
        store.add_category("Math", "numbers", "", CategorySource::Internal);
        store.set_internal_source(Box::new(StubSource {
            calls: Arc::clone(&calls),
        }));

        store.select_category("Math").await;
        assert_eq!(store.active_category().unwrap().questions.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Already populated: reselecting must not fetch again.
        store.select_category("Math").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_external_category_without_engine_stays_empty() {
        let mut store = empty_store();
        store.add_category("Remote", "engine backed", "", CategorySource::External);

        store.select_category("Remote").await;
        let category = store.active_category().unwrap();
        assert!(category.questions.is_empty());
    }

    #[tokio::test]
    async fn test_external_category_uses_external_source() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut store = empty_store();
        store.add_category("Remote", "engine backed", "", CategorySource::External);
        store.set_external_source(Box::new(StubSource {
            calls: Arc::clone(&calls),
        }));

        store.select_category("Remote").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.active_category().unwrap().questions.len(), 1);
    }

    #[test]
    fn test_remove_active_category_clears_selection() {
        let mut store = empty_store();
        store.add_category("Math", "", "", CategorySource::Internal);
        store.active = Some("Math".to_string());

        store.remove_category("Math");
        assert!(store.active_category().is_none());
        assert!(store.find_category("Math").is_none());
    }

    #[test]
    fn test_remove_missing_category_is_noop() {
        let mut store = empty_store();
        store.add_category("Math", "", "", CategorySource::Internal);
        store.remove_category("missing");
        assert_eq!(store.get_categories().len(), 1);
    }

    #[test]
    fn test_duplicate_category_names_are_rejected() {
        let mut store = empty_store();
        store.add_category("Math", "first", "", CategorySource::Internal);
        store.add_category("Math", "second", "", CategorySource::Internal);
        assert_eq!(store.get_categories().len(), 1);
        assert_eq!(store.find_category("Math").unwrap().description, "first");
    }

    #[tokio::test]
    async fn test_update_categories_is_lazy_force_is_not() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("categories.json");
        let mut file = std::fs::File::create(&manifest).unwrap();
        write!(file, r#"[{{"name": "Math", "description": "numbers"}}]"#).unwrap();
        drop(file);

        let mut store = CategoryStore::new(loader_for_dir(dir.path()));
        store.update_categories().await.unwrap();
        assert_eq!(store.get_categories().len(), 1);

        let mut file = std::fs::File::create(&manifest).unwrap();
        write!(
            file,
            r#"[{{"name": "Math", "description": "numbers"}}, {{"name": "History", "description": "the past"}}]"#
        )
        .unwrap();
        drop(file);

        // Lazy update: already populated, nothing happens.
        store.update_categories().await.unwrap();
        assert_eq!(store.get_categories().len(), 1);

        store.force_update_categories().await.unwrap();
        assert_eq!(store.get_categories().len(), 2);
    }

    #[tokio::test]
    async fn test_force_update_clears_vanished_active_selection() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("categories.json");
        let mut file = std::fs::File::create(&manifest).unwrap();
        write!(file, r#"[{{"name": "Math", "description": "numbers"}}]"#).unwrap();
        drop(file);

        let mut store = CategoryStore::new(loader_for_dir(dir.path()));
        store.update_categories().await.unwrap();
        store.active = Some("Math".to_string());

        let mut file = std::fs::File::create(&manifest).unwrap();
        write!(file, r#"[{{"name": "History", "description": "the past"}}]"#).unwrap();
        drop(file);

        store.force_update_categories().await.unwrap();
        assert!(store.active_category().is_none());
    }
}
