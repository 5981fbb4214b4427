mod common;

use chrono::NaiveDate;
use common::{Fixture, Repo};
use repopulse::query::{HeatmapMode, QueryEngine, SampleError};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 15).unwrap()
}

#[test]
fn test_language_top_repos_by_stars() {
    let fx = Fixture::new();
    fx.repos(
        "repo_20250401",
        &[
            Repo::new("a", Some("Rust"), 10),
            Repo::new("b", Some("Rust"), 50),
            Repo::new("c", Some("Rust"), 5),
            Repo::new("d", Some("Rust"), 90),
            Repo::new("e", Some("Rust"), 20),
            Repo::new("f", Some("Go"), 500),
        ],
    );
    let db = fx.database();
    let engine = QueryEngine::new(&db);

    let top = engine.language_top_repos("Rust", Some(3));
    let stars: Vec<i64> = top.iter().map(|r| r.stars).collect();
    assert_eq!(stars, vec![90, 50, 20]);
    assert_eq!(top[0].repo_name, "d");
    assert_eq!(top[0].full_name.as_deref(), Some("octo/d"));

    // default limit is 6, unknown languages are empty
    assert_eq!(engine.language_top_repos("Rust", None).len(), 5);
    assert!(engine.language_top_repos("Haskell", None).is_empty());
    // a zero limit still returns one row
    assert_eq!(engine.language_top_repos("Rust", Some(0)).len(), 1);
}

#[test]
fn test_missing_tables_yield_empty_results() {
    let fx = Fixture::new();
    fx.repos("repo_20250401", &[Repo::new("a", Some("Rust"), 1)]);
    let db = fx.database();
    let engine = QueryEngine::new(&db);

    assert!(engine.company_distribution().is_empty());
    assert!(engine.contributor_locations().is_empty());
    assert!(engine.repositories_with_activity().is_empty());
    assert!(engine.activity_heatmap(None, HeatmapMode::Concat, today()).is_empty());
}

#[test]
fn test_distributions_are_capped_and_descending() {
    let fx = Fixture::new();

    let languages: Vec<String> = (0..20).map(|i| format!("Lang{:02}", i)).collect();
    let mut repos = Vec::new();
    let names: Vec<String> = (0..300).map(|i| format!("repo{}", i)).collect();
    let mut n = 0;
    for (i, language) in languages.iter().enumerate() {
        // Lang00 has 1 repo, Lang19 has 20
        for _ in 0..=i {
            repos.push(Repo::new(&names[n], Some(language.as_str()), 1));
            n += 1;
        }
    }
    repos.push(Repo::new("unknown", None, 1));
    repos.push(Repo::new("blank", Some(""), 1));
    fx.repos("repo_20250401", &repos);

    let companies: Vec<String> = (0..20).map(|i| format!("Company{}", i)).collect();
    let locations: Vec<String> = (0..40).map(|i| format!("City{}", i)).collect();
    let mut contributors = Vec::new();
    for (i, company) in companies.iter().enumerate() {
        for j in 0..=i {
            contributors.push((Some(company.as_str()), None, j as i64));
        }
    }
    for (i, location) in locations.iter().enumerate() {
        for _ in 0..=(i % 5) {
            contributors.push((None, Some(location.as_str()), 1));
        }
    }
    fx.contributors("repo_contributors_20250401", &contributors);

    let db = fx.database();
    let engine = QueryEngine::new(&db);

    let langs = engine.language_distribution();
    assert_eq!(langs.len(), 15);
    assert_eq!(langs[0].language, "Lang19");
    assert_eq!(langs[0].count, 20);
    assert!(langs.windows(2).all(|w| w[0].count >= w[1].count));
    assert!(langs.iter().all(|l| !l.language.is_empty()));

    let companies = engine.company_distribution();
    assert_eq!(companies.len(), 15);
    assert_eq!(companies[0].company, "Company19");
    assert_eq!(companies[0].contributor_count, 20);
    assert_eq!(companies[0].repo_count, 20);
    assert!(companies.windows(2).all(|w| w[0].contributor_count >= w[1].contributor_count));

    let locations = engine.contributor_locations();
    assert_eq!(locations.len(), 30);
    assert_eq!(locations[0].contributor_count, 5);
    assert!(locations.windows(2).all(|w| w[0].contributor_count >= w[1].contributor_count));
}

#[test]
fn test_queries_read_latest_snapshot() {
    let fx = Fixture::new();
    fx.repos("repo_20250301", &[Repo::new("old", Some("Perl"), 1)]);
    fx.repos("repo_20250401", &[Repo::new("new", Some("Rust"), 1)]);
    let db = fx.database();
    let engine = QueryEngine::new(&db);

    let langs = engine.language_distribution();
    assert_eq!(langs.len(), 1);
    assert_eq!(langs[0].language, "Rust");
}

#[test]
fn test_scatter_queries_filter_and_sort() {
    let fx = Fixture::new();
    let mut quiet = Repo::new("quiet", Some("Rust"), 500);
    quiet.contributors = 0;
    quiet.open_issues = 0;
    let mut busy = Repo::new("busy", Some("Go"), 100);
    busy.contributors = 12;
    busy.open_issues = 3;
    let mut star = Repo::new("star", None, 900);
    star.contributors = 40;
    star.open_issues = 0;
    fx.repos("repo_20250401", &[quiet, busy, star]);
    let db = fx.database();
    let engine = QueryEngine::new(&db);

    let contributors = engine.stars_contributors_relation();
    let names: Vec<&str> = contributors.iter().map(|p| p.repo_name.as_str()).collect();
    assert_eq!(names, vec!["star", "busy"]);
    assert_eq!(contributors[0].language, None);
    assert_eq!(contributors[1].contributors_count, 12);

    let issues = engine.stars_issues_relation();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].repo_name, "busy");
    assert_eq!(issues[0].open_issues, 3);
}

#[test]
fn test_activity_heatmap_concatenates_rows() {
    let fx = Fixture::new();
    fx.activity(
        "repo_activity_20250401",
        &[
            ("tokio", 1, None, Some("[1,2,3,4,5,6,7]")),
            ("tokio", 1, None, Some("[0,0,0,0,0,0,14]")),
            ("serde", 2, None, Some("[9,9,9,9,9,9,9]")),
        ],
    );
    let db = fx.database();
    let engine = QueryEngine::new(&db);

    let days = engine.activity_heatmap(Some("tokio"), HeatmapMode::Concat, today());
    assert_eq!(days.len(), 365);
    assert_eq!(days[364].count, 14);
    assert_eq!(days[364].date, today());
    assert_eq!(days[363].count, 0);
    assert!(days[..=350].iter().all(|d| d.count == 0));
    assert_eq!(days[351].count, 1);

    let all = engine.activity_heatmap(None, HeatmapMode::Concat, today());
    assert_eq!(all.len(), 365);
    assert_eq!(all[364].count, 9);
    assert!(all[..=343].iter().all(|d| d.count == 0));

    assert!(engine.activity_heatmap(Some("missing"), HeatmapMode::Concat, today()).is_empty());
}

#[test]
fn test_activity_heatmap_skips_malformed_rows() {
    let fx = Fixture::new();
    fx.activity(
        "repo_activity_20250401",
        &[
            ("tokio", 1, None, Some("[1,1,1,1,1,1,1]")),
            ("tokio", 1, None, Some("not json")),
            ("tokio", 1, None, None),
            ("tokio", 1, None, Some("[1,2,3]")),
            ("tokio", 1, None, Some("[0,0,0,0,0,0,5]")),
        ],
    );
    let db = fx.database();
    let engine = QueryEngine::new(&db);

    let report = engine.activity_heatmap_report(Some("tokio"), HeatmapMode::Concat, today());
    assert_eq!(report.rows, 5);
    assert_eq!(report.discarded.len(), 3);
    assert_eq!(report.days.len(), 365);
    assert_eq!(report.days[364].count, 5);
    assert_eq!(report.days[357].count, 1);
    assert!(report.days[..=350].iter().all(|d| d.count == 0));
}

#[test]
fn test_activity_heatmap_skips_non_text_rows() {
    let fx = Fixture::new();
    // untyped columns keep whatever storage class the scraper wrote
    fx.execute(
        "CREATE TABLE repo_activity_20250401 (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             repo_name TEXT NOT NULL,
             repo_id INTEGER NOT NULL,
             week_start,
             day_commits
         );",
    );
    fx.activity("repo_activity_20250401", &[("tokio", 1, None, Some("[1,1,1,1,1,1,1]"))]);
    fx.execute(
        "INSERT INTO repo_activity_20250401 (repo_name, repo_id, day_commits) VALUES ('tokio', 1, X'5B315D');
         INSERT INTO repo_activity_20250401 (repo_name, repo_id, day_commits) VALUES ('tokio', 1, 7);",
    );
    fx.activity("repo_activity_20250401", &[("tokio", 1, None, Some("[0,0,0,0,0,0,5]"))]);
    let db = fx.database();
    let engine = QueryEngine::new(&db);

    let report = engine.activity_heatmap_report(Some("tokio"), HeatmapMode::Concat, today());
    assert_eq!(report.rows, 4);
    assert_eq!(report.discarded.len(), 2);
    assert!(report.discarded.iter().all(|e| matches!(e, SampleError::NotText { column: "day_commits", .. })));
    assert_eq!(report.days.len(), 365);
    assert_eq!(report.days[364].count, 5);
    assert_eq!(report.days[357].count, 1);

    // a non-text week_start only matters when weekly mode reads it
    fx.execute(
        "INSERT INTO repo_activity_20250401 (repo_name, repo_id, week_start, day_commits)
         VALUES ('serde', 2, 20250413, '[1,1,1,1,1,1,1]');",
    );
    let report = engine.activity_heatmap_report(Some("serde"), HeatmapMode::Weekly, today());
    assert_eq!(report.rows, 1);
    assert!(matches!(report.discarded[0], SampleError::NotText { column: "week_start", .. }));
    assert_eq!(report.days.len(), 365);
}

#[test]
fn test_activity_heatmap_weekly_saturates_huge_counts() {
    let fx = Fixture::new();
    fx.activity(
        "repo_activity_20250401",
        &[
            ("tokio", 1, Some("2025-04-13"), Some("[18446744073709551615,0,0,0,0,0,0]")),
            ("tokio", 1, Some("2025-04-13"), Some("[1,0,0,0,0,0,0]")),
        ],
    );
    let db = fx.database();
    let days = QueryEngine::new(&db).activity_heatmap(Some("tokio"), HeatmapMode::Weekly, today());

    assert_eq!(days.len(), 365);
    assert_eq!(days[362].count, u64::MAX);
}

#[test]
fn test_activity_heatmap_weekly_sums_by_date() {
    let fx = Fixture::new();
    fx.activity(
        "repo_activity_20250401",
        &[
            ("tokio", 1, Some("2025-04-13"), Some("[1,2,3,0,0,0,0]")),
            ("serde", 2, Some("2025-04-13"), Some("[1,1,1,0,0,0,0]")),
            ("serde", 2, None, Some("[5,5,5,5,5,5,5]")),
        ],
    );
    let db = fx.database();
    let engine = QueryEngine::new(&db);

    let report = engine.activity_heatmap_report(None, HeatmapMode::Weekly, today());
    assert_eq!(report.discarded.len(), 1);
    assert_eq!(report.days.len(), 365);
    // 2025-04-13 .. 2025-04-15 are the last three days
    assert_eq!(report.days[362].count, 2);
    assert_eq!(report.days[363].count, 3);
    assert_eq!(report.days[364].count, 4);
    assert_eq!(report.days.iter().map(|d| d.count).sum::<u64>(), 9);
}

#[test]
fn test_repositories_with_activity_distinct() {
    let fx = Fixture::new();
    fx.activity(
        "repo_activity_20250401",
        &[
            ("tokio", 1, None, Some("[0,0,0,0,0,0,0]")),
            ("axum", 3, None, Some("[0,0,0,0,0,0,0]")),
            ("tokio", 1, None, Some("[0,0,0,0,0,0,0]")),
        ],
    );
    let db = fx.database();
    let repos = QueryEngine::new(&db).repositories_with_activity();

    let names: Vec<&str> = repos.iter().map(|r| r.repo_name.as_str()).collect();
    assert_eq!(names, vec!["axum", "tokio"]);
    assert_eq!(repos[1].repo_id, 1);
}

#[test]
fn test_language_trends_across_snapshots() {
    let fx = Fixture::new();
    fx.repos(
        "repo_20250401",
        &[
            Repo::new("a", Some("Rust"), 1),
            Repo::new("b", Some("Rust"), 1),
            Repo::new("c", Some("Go"), 1),
        ],
    );
    fx.repos("repo_20250301", &[Repo::new("a", Some("Rust"), 1)]);
    fx.repos("repo_latest", &[Repo::new("z", Some("Zig"), 1)]);
    let db = fx.database();
    let series = QueryEngine::new(&db).language_trends();

    let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Rust", "Go"]);

    let rust = &series[0];
    assert_eq!(rust.data.len(), 2);
    assert_eq!(rust.data[0].date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    assert_eq!(rust.data[0].count, 1);
    assert_eq!(rust.data[1].count, 2);
    assert_eq!(series[1].data.len(), 1);
}

#[test]
fn test_top_repositories_with_star_history() {
    let fx = Fixture::new();
    fx.repos(
        "repo_20250301",
        &[Repo::new("tokio", Some("Rust"), 800), Repo::new("serde", Some("Rust"), 400)],
    );
    fx.repos("repo_20250320", &[Repo::new("tokio", Some("Rust"), 900)]);
    fx.repos(
        "repo_20250401",
        &[
            Repo::new("tokio", Some("Rust"), 1000),
            Repo::new("serde", Some("Rust"), 500),
            Repo::new("newcomer", None, 50),
        ],
    );
    let db = fx.database();
    let top = QueryEngine::new(&db).top_repositories();

    let names: Vec<&str> = top.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["tokio", "serde", "newcomer"]);
    // 2025-03-01 is exactly one month before the latest capture
    assert_eq!(top[0].stars_month_ago, Some(800));
    assert_eq!(top[1].stars_month_ago, Some(400));
    assert_eq!(top[2].stars_month_ago, None);
    assert_eq!(top[0].owner.as_deref(), Some("octo"));
    assert_eq!(top[0].url.as_deref(), Some("https://github.com/octo/tokio"));
}

#[test]
fn test_top_repositories_ignore_stale_history() {
    let fx = Fixture::new();
    fx.repos("repo_20200101", &[Repo::new("tokio", Some("Rust"), 3)]);
    fx.repos("repo_20250401", &[Repo::new("tokio", Some("Rust"), 1000)]);
    let db = fx.database();
    let top = QueryEngine::new(&db).top_repositories();

    assert_eq!(top.len(), 1);
    assert_eq!(top[0].stars_month_ago, None);
}

#[test]
fn test_top_repositories_without_history() {
    let fx = Fixture::new();
    fx.repos("repo_20250401", &[Repo::new("tokio", Some("Rust"), 1000)]);
    let db = fx.database();
    let top = QueryEngine::new(&db).top_repositories();

    assert_eq!(top.len(), 1);
    assert_eq!(top[0].stars_month_ago, None);
}

#[test]
fn test_health_and_snapshots() {
    let fx = Fixture::new();
    fx.repos("repo_20250401", &[]);
    fx.contributors("repo_contributors_20250401", &[]);
    fx.activity("repo_activity_20250401", &[]);
    let db = fx.database();
    let engine = QueryEngine::new(&db);

    assert!(engine.health().is_ok());

    let snapshots = engine.snapshots();
    assert_eq!(snapshots.len(), 3);
    assert!(snapshots.iter().all(|s| s.date == NaiveDate::from_ymd_opt(2025, 4, 1)));
}
