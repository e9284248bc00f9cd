use chrono::{Duration, Utc};
use hubrank::core::commands::Command;
use hubrank::core::handler::{CommandHandler, HandlerOptions, Reply};
use hubrank::core::leaderboard::{rank, Placing, Statistic};
use hubrank::error::{BotError, BotResult};
use hubrank::github::client::ProfileProvider;
use hubrank::github::profile::{Contributions, ProfileRecord};
use hubrank::storage::Database;
use std::sync::Arc;

struct StaticProvider(Vec<(&'static str, u64, u64)>);

impl ProfileProvider for StaticProvider {
    async fn fetch_profile(&self, handle: &str) -> BotResult<ProfileRecord> {
        let (login, commits, issues) = self
            .0
            .iter()
            .find(|(login, _, _)| *login == handle)
            .ok_or_else(|| BotError::fetch(handle, "404 Not Found"))?;

        Ok(ProfileRecord {
            handle: login.to_string(),
            name: None,
            avatar_url: String::new(),
            profile_url: format!("https://github.com/{login}"),
            bio: None,
            pronouns: None,
            status: None,
            contributions: Contributions {
                commits: *commits,
                repos: 0,
                prs: 0,
                issues: *issues,
            },
        })
    }
}

fn handler(db: Arc<Database>) -> CommandHandler<StaticProvider> {
    CommandHandler::new(
        db,
        StaticProvider(vec![("alice", 10, 4), ("bob", 25, 1), ("carol", 7, 9), ("dave", 3, 0)]),
        HandlerOptions {
            freshness_window: Duration::minutes(10),
            refresh_stale: false,
            profile_url: "https://github.com/".to_string(),
        },
    )
}

fn run(text: &str) -> Command {
    Command::build_from(text).unwrap()
}

#[tokio::test]
async fn commands_persist_across_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("hubrank.db");

    {
        let db = Arc::new(Database::open(&path).unwrap());
        let handler = handler(db);
        for user in ["alice", "bob", "carol", "dave"] {
            let reply = handler.execute("T1", run(&format!("!add {user}"))).await;
            assert!(matches!(reply, Reply::Added { already_tracked: false, .. }));
        }
        handler.execute("T2", run("!add alice")).await;
        handler.execute("T1", run("!remove alice")).await;
    }

    let db = Database::open(&path).unwrap();

    let standings = rank(&db, "T1", Statistic::Commits).unwrap();
    let ranked = standings
        .iter()
        .map(|s| (s.placing, s.handle.as_str(), s.value))
        .collect::<Vec<_>>();
    assert_eq!(
        ranked,
        vec![
            (Placing::Podium(1), "bob", 25),
            (Placing::Podium(2), "carol", 7),
            (Placing::Podium(3), "dave", 3),
        ]
    );

    let standings = rank(&db, "T2", Statistic::Issues).unwrap();
    assert_eq!(standings.len(), 1);
    assert_eq!(standings[0].handle, "alice");

    // removal from T1 kept the cached statistics
    let alice = db.get_user("alice").unwrap().unwrap();
    assert_eq!(alice.issues, 4);
    assert!(alice.is_fresh(Utc::now(), Duration::minutes(10)));
}

#[tokio::test]
async fn unknown_user_reply_and_rendered_board() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let handler = handler(db.clone());

    let reply = handler.execute("T1", run("!user ghost")).await;
    assert_eq!(reply.to_string(), "❌ Failed to get user info for ghost");
    assert!(db.get_user("ghost").unwrap().is_none());

    handler.execute("T1", run("!add alice")).await;
    handler.execute("T1", run("!add bob")).await;

    let board = handler
        .execute("T1", run("!leaderboard issues"))
        .await
        .to_string();
    let lines = board.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("*alice*") && lines[1].ends_with("*4* issues"));
    assert!(lines[2].contains("*bob*") && lines[2].ends_with("*1* issues"));
}
