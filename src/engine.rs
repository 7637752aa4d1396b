use crate::config::EngineConfig;
use futures_util::future::join_all;
use serde::Deserialize;

/// The local question model expects exactly this many options per question;
/// remote questions with any other count are dropped.
const EXPECTED_OPTION_COUNT: usize = 4;

/// One page of the remote quiz listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnginePage {
    pub content: Vec<EngineQuestion>,
    pub total_pages: u32,
    pub total_elements: u64,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub number_of_elements: u32,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineQuestion {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub text: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolveResponse {
    pub success: bool,
    #[serde(default)]
    pub feedback: String,
}

/// A remote question together with its discovered correct option index.
#[derive(Debug, Clone)]
pub struct ResolvedQuestion {
    pub text: String,
    pub answers: Vec<String>,
    pub correct_answer: usize,
}

/// Client for the remote quiz engine. The API only offers a verdict endpoint
/// ("submit a guess, learn whether it was right"), so the correct option of
/// every question is discovered by probing all of its options.
///
/// Every network failure here is logged and degraded to `None`; the caller
/// skips that unit of work (page or question) and keeps whatever succeeded.
pub struct QuizEngine {
    base_url: String,
    port: u16,
    email: String,
    password: String,
    client: reqwest::Client,
}

impl QuizEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            base_url: config.base_url,
            port: config.port,
            email: config.email,
            password: config.password,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}:{}{}", self.base_url, self.port, path)
    }

    /// Reachability/auth probe. Not on any critical path.
    #[tracing::instrument(skip(self))]
    pub async fn test_connection(&self) -> bool {
        let url = self.endpoint("/api/quizzes");
        let response = self
            .client
            .get(&url)
            .query(&[("page", 1u32)])
            .basic_auth(&self.email, Some(&self.password))
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::error!(
                    status = %response.status(),
                    "Quiz engine rejected connection test"
                );
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Error connecting to the quiz engine");
                false
            }
        }
    }

    /// Fetches one page of the paginated question listing.
    #[tracing::instrument(skip(self))]
    pub async fn get_page(&self, page: u32) -> Option<EnginePage> {
        let url = self.endpoint("/api/quizzes");
        let response = match self
            .client
            .get(&url)
            .query(&[("page", page)])
            .basic_auth(&self.email, Some(&self.password))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, page, "Error fetching quiz page");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), page, "Quiz page request failed");
            return None;
        }

        match response.json::<EnginePage>().await {
            Ok(engine_page) => Some(engine_page),
            Err(e) => {
                tracing::error!(error = %e, page, "Error decoding quiz page");
                None
            }
        }
    }

    /// Submits one guess for a question and returns the server's verdict.
    pub async fn solve_question(
        &self,
        question: &EngineQuestion,
        answer_nr: usize,
    ) -> Option<SolveResponse> {
        let url = self.endpoint(&format!("/api/quizzes/{}/solve", question.id));
        // The solve endpoint expects an array holding the one guessed index.
        let response = match self
            .client
            .post(&url)
            .basic_auth(&self.email, Some(&self.password))
            .json(&[answer_nr])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, question.id = question.id, "Error solving question");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::error!(
                status = %response.status(),
                question.id = question.id,
                "Solve request failed"
            );
            return None;
        }

        match response.json::<SolveResponse>().await {
            Ok(verdict) => Some(verdict),
            Err(e) => {
                tracing::error!(error = %e, question.id = question.id, "Error decoding verdict");
                None
            }
        }
    }

    /// Discovers the correct option of a question by probing every option.
    /// All probes are dispatched before any is awaited, so the server may see
    /// them in any order. If more than one probe reports success the lowest
    /// index wins; `None` if none did (the caller discards the question).
    #[tracing::instrument(skip(self, question), fields(question.id = question.id))]
    pub async fn get_correct_answer(&self, question: &EngineQuestion) -> Option<usize> {
        let probes = (0..question.options.len()).map(|answer_nr| self.solve_question(question, answer_nr));
        let verdicts = join_all(probes).await;

        verdicts
            .iter()
            .position(|verdict| verdict.as_ref().is_some_and(|v| v.success))
    }

    /// Fetches one page and resolves the correct answer of every question on
    /// it concurrently. Questions whose resolution failed or whose option
    /// count is not exactly four are filtered out.
    #[tracing::instrument(skip(self))]
    pub async fn get_questions_from_page(&self, page: u32) -> Option<Vec<ResolvedQuestion>> {
        let engine_page = self.get_page(page).await?;

        let resolved = join_all(
            engine_page
                .content
                .iter()
                .map(|question| self.get_correct_answer(question)),
        )
        .await;

        let fetched = engine_page.content.len();
        let mut questions = Vec::new();
        for (question, correct_answer) in engine_page.content.into_iter().zip(resolved) {
            let Some(correct_answer) = correct_answer else {
                tracing::debug!(question.id = question.id, "No probe succeeded, discarding");
                continue;
            };
            if question.options.len() != EXPECTED_OPTION_COUNT {
                tracing::debug!(
                    question.id = question.id,
                    options.count = question.options.len(),
                    "Unexpected option count, discarding"
                );
                continue;
            }
            questions.push(ResolvedQuestion {
                text: question.text,
                answers: question.options,
                correct_answer,
            });
        }

        tracing::debug!(
            page,
            questions.resolved = questions.len(),
            questions.fetched = fetched,
            "Resolved quiz page"
        );
        Some(questions)
    }

    /// Resolves every question the engine has. Returns `None` only when the
    /// first page (which supplies the pagination bounds) is unreachable.
    pub async fn get_all_questions(&self) -> Option<Vec<ResolvedQuestion>> {
        let mut questions = Vec::new();
        if !self.append_questions(&mut questions).await {
            return None;
        }
        Some(questions)
    }

    /// Walks all pages strictly in order, appending each page's resolved
    /// questions. A page that fails to fetch is skipped, not fatal. The page
    /// count is read once from page 0 and trusted for the whole traversal;
    /// concurrent remote writes can make it stale, which is accepted.
    #[tracing::instrument(skip(self, questions))]
    pub async fn append_questions(&self, questions: &mut Vec<ResolvedQuestion>) -> bool {
        let Some(first_page) = self.get_page(0).await else {
            tracing::error!("Unable to reach quiz engine for pagination bounds");
            return false;
        };

        for page in 0..first_page.total_pages {
            match self.get_questions_from_page(page).await {
                Some(batch) => questions.extend(batch),
                None => {
                    tracing::warn!(page, "Skipping unreachable quiz page");
                }
            }
        }

        tracing::info!(
            questions.count = questions.len(),
            pages.total = first_page.total_pages,
            elements.total = first_page.total_elements,
            "Finished quiz engine traversal"
        );
        true
    }
}
