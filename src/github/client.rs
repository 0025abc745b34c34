//! Octocrab client wrapper scoped to the repository `gg` operates on.

use super::{BuildStatus, NewPullRequest, PullRequest, Review, ReviewHost, ReviewState};
use crate::{
    config::RepoSlug,
    errors::{GgError, GgResult},
};
use chrono::{DateTime, Utc};
use octocrab::{
    models::{pulls::PullRequest as PullRequestModel, IssueState},
    params, Octocrab,
};
use serde::{Deserialize, Serialize};

const PAGE_SIZE: u8 = 100;

const REVIEWS_QUERY: &str = r#"
query($owner: String!, $repo: String!, $number: Int!, $cursor: String) {
    repository(owner: $owner, name: $repo) {
        pullRequest(number: $number) {
            reviews(first: 100, after: $cursor) {
                edges { node { author { login } state submittedAt } }
                pageInfo { hasNextPage endCursor }
            }
        }
    }
}
"#;

/// A [ReviewHost] talking to GitHub, scoped to a single repository.
#[derive(Clone)]
pub struct GitHubHost {
    /// The underlying octocrab client.
    client: Octocrab,
    /// The repository this client is scoped to.
    slug: RepoSlug,
}

impl GitHubHost {
    /// Creates a client for `slug`, authenticated with a personal access token.
    ///
    /// Hosts other than `github.com` are treated as GitHub Enterprise instances.
    pub fn from_token(token: impl Into<String>, slug: RepoSlug) -> GgResult<Self> {
        let mut builder = Octocrab::builder().personal_token(token.into());
        if slug.host != "github.com" {
            builder = builder.base_uri(format!("https://{}/api/v3", slug.host))?;
        }

        Ok(Self {
            client: builder.build()?,
            slug,
        })
    }

    fn owner(&self) -> &str {
        &self.slug.owner
    }

    fn repo_name(&self) -> &str {
        &self.slug.name
    }

    /// Maps an octocrab pull request onto [PullRequest].
    fn convert_pull_request(&self, pull: PullRequestModel) -> PullRequest {
        let state = match pull.state {
            Some(IssueState::Open) => "open",
            Some(IssueState::Closed) => "closed",
            _ => "",
        };

        PullRequest {
            number: pull.number,
            state: state.to_string(),
            title: pull.title.unwrap_or_default(),
            body: pull.body.unwrap_or_default(),
            url: pull
                .html_url
                .map(|u| u.to_string())
                .unwrap_or_else(|| self.slug.pull_request_url(pull.number)),
            head_ref: pull.head.ref_field,
            base_ref: pull.base.ref_field,
            author: pull.user.map(|u| u.login).unwrap_or_default(),
        }
    }
}

impl std::fmt::Debug for GitHubHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubHost")
            .field("slug", &self.slug)
            .finish_non_exhaustive()
    }
}

impl ReviewHost for GitHubHost {
    async fn find_pull_request(&self, branch: &str) -> GgResult<Option<PullRequest>> {
        let page = self
            .client
            .pulls(self.owner(), self.repo_name())
            .list()
            .state(params::State::Open)
            .head(format!("{}:{}", self.owner(), branch))
            .send()
            .await?;

        if page.items.len() > 1 {
            tracing::warn!(
                branch,
                count = page.items.len(),
                "Multiple open pull requests for branch"
            );
        }
        Ok(page.items.into_iter().next().map(|pull| self.convert_pull_request(pull)))
    }

    async fn list_open_pull_requests(&self) -> GgResult<Vec<PullRequest>> {
        let mut page = 1u32;
        let mut pulls = Vec::new();

        loop {
            let items = self
                .client
                .pulls(self.owner(), self.repo_name())
                .list()
                .state(params::State::Open)
                .per_page(PAGE_SIZE)
                .page(page)
                .send()
                .await?
                .items;

            let is_last_page = items.len() < PAGE_SIZE as usize;
            pulls.extend(items.into_iter().map(|pull| self.convert_pull_request(pull)));

            if is_last_page {
                break;
            }
            page += 1;
        }

        Ok(pulls)
    }

    async fn build_status(&self, reference: &str) -> GgResult<BuildStatus> {
        #[derive(Debug, Deserialize)]
        struct CombinedStatus {
            state: String,
            total_count: u64,
        }

        let route = format!(
            "/repos/{}/{}/commits/{}/status",
            self.owner(),
            self.repo_name(),
            urlencoding::encode(reference)
        );
        let status: CombinedStatus = self.client.get(route, None::<&()>).await?;

        Ok(BuildStatus {
            state: status.state,
            total_count: status.total_count,
        })
    }

    async fn reviews(&self, number: u64) -> GgResult<Vec<Review>> {
        #[derive(Serialize)]
        struct Variables<'a> {
            owner: &'a str,
            repo: &'a str,
            number: i64,
            cursor: Option<String>,
        }

        let mut reviews = Vec::new();
        let mut cursor = None;
        loop {
            let variables = Variables {
                owner: self.owner(),
                repo: self.repo_name(),
                number: number as i64,
                cursor,
            };

            let response: ReviewsQueryResponse = self
                .client
                .graphql(&serde_json::json!({
                    "query": REVIEWS_QUERY,
                    "variables": variables,
                }))
                .await?;

            let (page, next) = response.into_page(number)?;
            reviews.extend(page);
            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::debug!(number, count = reviews.len(), "Fetched reviews");
        Ok(reviews)
    }

    async fn update_base(&self, number: u64, base: &str) -> GgResult<bool> {
        let pull = self
            .client
            .pulls(self.owner(), self.repo_name())
            .update(number)
            .base(base)
            .send()
            .await?;

        Ok(pull.base.ref_field == base)
    }

    async fn merge_squash(
        &self,
        number: u64,
        sha: &str,
        title: &str,
        body: &str,
    ) -> GgResult<bool> {
        #[derive(Serialize)]
        struct MergeRequest<'a> {
            commit_title: &'a str,
            commit_message: &'a str,
            sha: &'a str,
            merge_method: &'static str,
        }

        #[derive(Debug, Deserialize)]
        struct MergeResponse {
            merged: bool,
            message: Option<String>,
        }

        let route = format!(
            "/repos/{}/{}/pulls/{}/merge",
            self.owner(),
            self.repo_name(),
            number
        );
        let request = MergeRequest {
            commit_title: title,
            commit_message: body,
            sha,
            merge_method: "squash",
        };

        let result: Result<MergeResponse, _> = self.client.put(route, Some(&request)).await;
        match result {
            Ok(response) => {
                if !response.merged {
                    tracing::warn!(
                        number,
                        message = response.message.as_deref().unwrap_or("unknown reason"),
                        "Merge request returned merged=false"
                    );
                }
                Ok(response.merged)
            }
            // 405: not mergeable. 409: head moved since `sha`.
            Err(octocrab::Error::GitHub { source, .. })
                if matches!(source.status_code.as_u16(), 405 | 409) =>
            {
                tracing::warn!(number, message = %source.message, "GitHub refused the merge");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_pull_request(&self, request: NewPullRequest) -> GgResult<PullRequest> {
        let pull = self
            .client
            .pulls(self.owner(), self.repo_name())
            .create(request.title, request.head, request.base)
            .body(request.body)
            .draft(request.draft)
            .send()
            .await?;

        Ok(self.convert_pull_request(pull))
    }

    async fn current_user_login(&self) -> GgResult<String> {
        Ok(self.client.current().user().await?.login)
    }
}

/// Response from the reviews GraphQL query.
#[derive(Debug, Deserialize)]
struct ReviewsQueryResponse {
    data: Option<ReviewsData>,
}

impl ReviewsQueryResponse {
    /// Splits one page of the response into its reviews and the cursor of the next page, if
    /// there is one.
    fn into_page(self, number: u64) -> GgResult<(Vec<Review>, Option<String>)> {
        let connection = self
            .data
            .and_then(|d| d.repository)
            .and_then(|r| r.pull_request)
            .ok_or_else(|| {
                GgError::external("GitHub API", format!("pull request #{} not found", number))
            })?
            .reviews;

        let reviews = connection
            .edges
            .into_iter()
            .map(|edge| Review {
                state: ReviewState::from(edge.node.state.as_str()),
                author: edge.node.author.map(|a| a.login).unwrap_or_default(),
                submitted_at: edge.node.submitted_at,
            })
            .collect();

        let next = connection
            .page_info
            .filter(|info| info.has_next_page)
            .and_then(|info| info.end_cursor);
        Ok((reviews, next))
    }
}

#[derive(Debug, Deserialize)]
struct ReviewsData {
    repository: Option<ReviewsRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewsRepository {
    pull_request: Option<ReviewsPullRequest>,
}

#[derive(Debug, Deserialize)]
struct ReviewsPullRequest {
    reviews: ReviewConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewConnection {
    edges: Vec<ReviewEdge>,
    page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewEdge {
    node: ReviewNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewNode {
    author: Option<ReviewAuthor>,
    state: String,
    submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ReviewAuthor {
    login: String,
}
