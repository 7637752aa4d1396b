use crate::model::Question;
use crate::store::CategoryStore;
use serde::Serialize;

/// Pages the navigation collaborator can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Categories,
    Quiz,
}

/// What the category list renderer needs to know about a category.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub description: String,
    pub image: String,
}

/// Rendering collaborator. The actual presentation mechanics live outside
/// the core; it only receives plain data.
pub trait QuizView {
    fn render_question(&mut self, question: &Question);
    fn render_categories(&mut self, categories: &[CategorySummary]);
}

/// Navigation collaborator, switching between the category list and the
/// quiz view.
pub trait Navigator {
    fn set_active_page(&mut self, page: Page);
}

/// Translates category-list intents into store operations and render calls.
pub struct CategoryController<V: QuizView, N: Navigator> {
    view: V,
    nav: N,
}

impl<V: QuizView, N: Navigator> CategoryController<V, N> {
    pub fn new(view: V, nav: N) -> Self {
        Self { view, nav }
    }

    /// Loads categories (lazily) and renders the list. A manifest that fails
    /// to load renders as an empty list.
    pub async fn show_categories(&mut self, store: &mut CategoryStore) {
        if let Err(e) = store.update_categories().await {
            tracing::error!(error = %e, "Failed to update categories");
        }
        let summaries: Vec<CategorySummary> = store
            .get_categories()
            .iter()
            .map(|c| CategorySummary {
                name: c.name.clone(),
                description: c.description.clone(),
                image: c.image.clone(),
            })
            .collect();
        self.view.render_categories(&summaries);
    }

    /// Selects a category and moves to the quiz page when the selection
    /// took effect. An unknown name keeps the user on the category list.
    pub async fn select_category(&mut self, store: &mut CategoryStore, name: &str) {
        store.select_category(name).await;
        if store.active_category().is_some_and(|c| c.name == name) {
            self.nav.set_active_page(Page::Quiz);
        }
    }
}

/// Translates quiz intents (answering, advancing) into category-ring
/// operations and render calls.
pub struct QuizController<V: QuizView, N: Navigator> {
    view: V,
    nav: N,
}

impl<V: QuizView, N: Navigator> QuizController<V, N> {
    pub fn new(view: V, nav: N) -> Self {
        Self { view, nav }
    }

    /// Records the answer if one was given, then advances the ring. When no
    /// unanswered question remains (or no category is active), navigation
    /// falls back to the category list.
    pub fn next_question(&mut self, store: &mut CategoryStore, answer_nr: Option<usize>) {
        if let Some(answer_nr) = answer_nr {
            if let Some(category) = store.active_category_mut() {
                category.submit_answer(answer_nr);
            }
        }

        let Some(category) = store.active_category_mut() else {
            self.nav.set_active_page(Page::Categories);
            return;
        };

        match category.next_question() {
            Some(question) => self.view.render_question(question),
            None => self.nav.set_active_page(Page::Categories),
        }
    }

    pub fn check_answer(&self, store: &CategoryStore, answer_nr: usize) -> bool {
        store
            .active_category()
            .and_then(|c| c.current_question())
            .is_some_and(|q| q.is_correct_answer_nr(answer_nr))
    }

    pub fn correct_answer(&self, store: &CategoryStore) -> Option<usize> {
        store
            .active_category()
            .and_then(|c| c.current_question())
            .map(|q| q.correct_answer)
    }

    pub fn submit_answer(&mut self, store: &mut CategoryStore, answer_nr: usize) {
        if let Some(category) = store.active_category_mut() {
            category.submit_answer(answer_nr);
        }
    }
}
