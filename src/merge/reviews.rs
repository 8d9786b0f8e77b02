//! Review aggregation
//!
//! Reduces a PR's review history to a single verdict. Only the latest review
//! per reviewer counts. When review teams are involved, every team has to
//! reach the approval threshold on its own.

use crate::config::AppConfig;
use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{PullRequest, Review, ReviewApproval, ReviewState};
use futures::future::try_join_all;
use std::collections::HashSet;
use tracing::debug;

/// A team whose approval is required, with its resolved members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMembership {
    /// Team slug
    pub slug: String,
    /// Whether the team was explicitly requested on the PR
    pub requested: bool,
    /// Member logins
    pub members: Vec<String>,
}

/// A team after reviewers were attributed to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewTeam {
    /// Team slug
    pub slug: String,
    /// Whether the team was explicitly requested on the PR
    pub requested: bool,
    /// PR reviewers attributed to this team
    pub reviewers: Vec<String>,
}

/// Keep only the latest review of every reviewer.
///
/// `reviews` must be in submission order. The result keeps that order.
pub fn effective_reviews(reviews: &[Review]) -> Vec<Review> {
    let mut seen = HashSet::new();
    let mut effective: Vec<Review> = reviews
        .iter()
        .rev()
        .filter(|review| seen.insert(review.user.as_str()))
        .cloned()
        .collect();
    effective.reverse();
    effective
}

/// Number of approvals a PR needs.
///
/// Fork PRs always need at least one, whatever the configuration says.
pub fn required_approvals(pr: &PullRequest, config: &AppConfig) -> u32 {
    config.min_approvals.max(u32::from(pr.is_cross_origin()))
}

/// Teams to account for: configured teams first, then requested ones.
///
/// Configured entries may be a team name or slug; they resolve to the slug of
/// a matching requested team when there is one. Unmatched entries are used
/// verbatim as slugs. Duplicates keep their first position.
pub fn review_team_slugs(pr: &PullRequest, config: &AppConfig) -> Vec<(String, bool)> {
    let configured = config.review_teams.iter().map(|entry| {
        pr.requested_teams
            .iter()
            .find(|team| team.slug == *entry || team.name == *entry)
            .map_or_else(|| (entry.clone(), false), |team| (team.slug.clone(), true))
    });
    let requested = pr
        .requested_teams
        .iter()
        .map(|team| (team.slug.clone(), true));

    let mut seen = HashSet::new();
    configured
        .chain(requested)
        .filter(|(slug, _)| seen.insert(slug.clone()))
        .collect()
}

/// Attribute reviewers to teams without overlap.
///
/// A reviewer counts for the first listed team they belong to. Teams left
/// without reviewers are dropped unless they were explicitly requested.
pub fn partition_teams(teams: Vec<TeamMembership>, reviewers: &[String]) -> Vec<ReviewTeam> {
    let mut consumed: HashSet<String> = HashSet::new();

    teams
        .into_iter()
        .filter_map(|team| {
            let mut assigned = Vec::new();
            for member in team.members {
                if reviewers.contains(&member) && consumed.insert(member.clone()) {
                    assigned.push(member);
                }
            }

            (!assigned.is_empty() || team.requested).then_some(ReviewTeam {
                slug: team.slug,
                requested: team.requested,
                reviewers: assigned,
            })
        })
        .collect()
}

fn count_approvals<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> u32 {
    let count = reviews
        .into_iter()
        .filter(|review| review.state == ReviewState::Approved)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Drop reviews from users who are not collaborators of the target repository
async fn collaborator_reviews(
    platform: &dyn PlatformService,
    pr: &PullRequest,
    reviews: Vec<Review>,
) -> Result<Vec<Review>> {
    let mut kept = Vec::with_capacity(reviews.len());
    for review in reviews {
        if platform.is_collaborator(&pr.base_repo, &review.user).await? {
            kept.push(review);
        } else {
            debug!(user = %review.user, "ignoring review from non-collaborator");
        }
    }
    Ok(kept)
}

/// Return the review approval state for the given pull request.
///
/// `reviews` is the raw review history in submission order. Team membership
/// lookups are issued concurrently; a forbidden or missing team surfaces as
/// [`Error::MergeCheck`](crate::error::Error::MergeCheck).
pub async fn review_approval(
    platform: &dyn PlatformService,
    pr: &PullRequest,
    reviews: &[Review],
    config: &AppConfig,
) -> Result<ReviewApproval> {
    let number = pr.number;
    debug!(pr_number = number, "checking if PR is approved via reviews");

    let mut effective = effective_reviews(reviews);
    if config.collaborators_only {
        effective = collaborator_reviews(platform, pr, effective).await?;
    }

    if effective
        .iter()
        .any(|review| review.state == ReviewState::ChangesRequested)
    {
        debug!(pr_number = number, "skipping: reviews request changes");
        return Ok(ReviewApproval::ChangesRequested);
    }

    let min_approvals = required_approvals(pr, config);
    let approvals = count_approvals(&effective);
    if approvals < min_approvals {
        debug!(pr_number = number, approvals, min_approvals, "skipping: lacks approvals");
        return Ok(ReviewApproval::ReviewsMissing);
    }

    let team_slugs = review_team_slugs(pr, config);
    if team_slugs.is_empty() {
        debug!(pr_number = number, "approved via review(s)");
        return Ok(ReviewApproval::Approved);
    }

    if pr.base_repo.is_user_owned() {
        debug!(
            pr_number = number,
            owner = %pr.base_repo.owner,
            "target is not an organization, skipping team reviews"
        );
        return Ok(ReviewApproval::Approved);
    }

    let org = pr.base_repo.owner.as_str();
    let members = try_join_all(
        team_slugs
            .iter()
            .map(|(slug, _)| platform.list_team_members(org, slug)),
    )
    .await?;

    let memberships = team_slugs
        .into_iter()
        .zip(members)
        .map(|((slug, requested), members)| TeamMembership {
            slug,
            requested,
            members,
        })
        .collect();

    let mut reviewers: Vec<String> = effective.iter().map(|review| review.user.clone()).collect();
    for login in &pr.requested_reviewers {
        if !reviewers.contains(login) {
            reviewers.push(login.clone());
        }
    }

    for team in partition_teams(memberships, &reviewers) {
        let team_approvals = count_approvals(
            effective
                .iter()
                .filter(|review| team.reviewers.contains(&review.user)),
        );

        if team_approvals < min_approvals {
            debug!(
                pr_number = number,
                team = %team.slug,
                approvals = team_approvals,
                min_approvals,
                "skipping: team lacks approvals"
            );
            return Ok(ReviewApproval::ReviewsMissing);
        }
    }

    debug!(pr_number = number, "approved via team review(s)");
    Ok(ReviewApproval::Approved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Repository, RequestedTeam};

    fn review(user: &str, state: ReviewState) -> Review {
        Review::new(user, state)
    }

    fn pr() -> PullRequest {
        PullRequest {
            number: 1,
            is_draft: false,
            is_merged: false,
            mergeable: Some(true),
            rebaseable: Some(true),
            head_ref: "feature".to_string(),
            head_sha: "abc".to_string(),
            head_repo: Some(Repository::new("acme", "widgets")),
            base_ref: "main".to_string(),
            base_repo: Repository::new("acme", "widgets"),
            requested_reviewers: vec![],
            requested_teams: vec![],
        }
    }

    fn membership(slug: &str, requested: bool, members: &[&str]) -> TeamMembership {
        TeamMembership {
            slug: slug.to_string(),
            requested,
            members: members.iter().map(ToString::to_string).collect(),
        }
    }

    fn logins(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_effective_reviews_keep_latest_per_reviewer() {
        let reviews = vec![
            review("a", ReviewState::ChangesRequested),
            review("b", ReviewState::Commented),
            review("a", ReviewState::Commented),
            review("a", ReviewState::Approved),
            review("c", ReviewState::Approved),
        ];

        let effective = effective_reviews(&reviews);
        assert_eq!(
            effective,
            vec![
                review("b", ReviewState::Commented),
                review("a", ReviewState::Approved),
                review("c", ReviewState::Approved),
            ]
        );
    }

    #[test]
    fn test_effective_reviews_empty() {
        assert!(effective_reviews(&[]).is_empty());
    }

    #[test]
    fn test_fork_pr_needs_one_approval() {
        let config = AppConfig {
            min_approvals: 0,
            ..AppConfig::default()
        };
        let mut pr = pr();
        assert_eq!(required_approvals(&pr, &config), 0);

        pr.head_repo = Some(Repository::new("someone", "widgets"));
        assert_eq!(required_approvals(&pr, &config), 1);
    }

    #[test]
    fn test_configured_minimum_wins_when_higher() {
        let config = AppConfig {
            min_approvals: 3,
            ..AppConfig::default()
        };
        let mut pr = pr();
        pr.head_repo = None;
        assert_eq!(required_approvals(&pr, &config), 3);
    }

    #[test]
    fn test_team_slugs_union_without_duplicates() {
        let config = AppConfig {
            review_teams: logins(&["dev", "Design Team", "dev"]),
            ..AppConfig::default()
        };
        let mut pr = pr();
        pr.requested_teams = vec![
            RequestedTeam {
                name: "Design Team".to_string(),
                slug: "design-team".to_string(),
            },
            RequestedTeam {
                name: "QA".to_string(),
                slug: "qa".to_string(),
            },
        ];

        assert_eq!(
            review_team_slugs(&pr, &config),
            vec![
                ("dev".to_string(), false),
                ("design-team".to_string(), true),
                ("qa".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_unrequested_team_entry_is_used_verbatim() {
        let config = AppConfig {
            review_teams: logins(&["Design Team"]),
            ..AppConfig::default()
        };

        assert_eq!(
            review_team_slugs(&pr(), &config),
            vec![("Design Team".to_string(), false)]
        );
    }

    #[test]
    fn test_partition_attributes_reviewer_to_first_team() {
        let teams = vec![
            membership("dev", false, &["a", "b"]),
            membership("design", false, &["a", "b", "c"]),
        ];

        let partition = partition_teams(teams, &logins(&["b", "c"]));
        assert_eq!(partition.len(), 2);
        assert_eq!(partition[0].slug, "dev");
        assert_eq!(partition[0].reviewers, logins(&["b"]));
        assert_eq!(partition[1].slug, "design");
        assert_eq!(partition[1].reviewers, logins(&["c"]));
    }

    #[test]
    fn test_partition_drops_empty_unrequested_teams() {
        let teams = vec![
            membership("dev", false, &["a", "b"]),
            membership("design", false, &["b"]),
            membership("qa", true, &["q"]),
        ];

        let partition = partition_teams(teams, &logins(&["a", "b"]));
        let slugs: Vec<&str> = partition.iter().map(|t| t.slug.as_str()).collect();
        // design lost b to dev; qa has no reviewer but was requested
        assert_eq!(slugs, vec!["dev", "qa"]);
        assert!(partition[1].reviewers.is_empty());
    }
}
