use minijinja::{Environment, Template};
use once_cell::sync::Lazy;
use strum::{EnumIter, IntoEnumIterator};
use tracing::info;

static TEMPLATES_ENVIRONMENT: Lazy<Environment> = Lazy::new(|| {
    info!("Initializing templating engine environment.");
    let mut env = Environment::new();

    // Use strum to iterate over the variants of the enum.
    for template in MessageTemplate::iter() {
        env.add_template(template.name(), template.template())
            .unwrap();
    }

    info!("Templates loaded in templating engine environment.");

    env
});

#[derive(Debug, EnumIter)]
pub enum MessageTemplate {
    Help,
    ProfileCard,
    Profile,
    Added,
    Removed,
    Leaderboard,
    FetchFailed,
    InvalidCommand,
    Failure,
}

impl MessageTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            MessageTemplate::Help => "help.txt",
            MessageTemplate::ProfileCard => "profile_card.txt",
            MessageTemplate::Profile => "profile.txt",
            MessageTemplate::Added => "added.txt",
            MessageTemplate::Removed => "removed.txt",
            MessageTemplate::Leaderboard => "leaderboard.txt",
            MessageTemplate::FetchFailed => "fetch_failed.txt",
            MessageTemplate::InvalidCommand => "invalid_command.txt",
            MessageTemplate::Failure => "failure.txt",
        }
    }

    pub fn get(&self) -> Result<Template<'_, '_>, minijinja::Error> {
        TEMPLATES_ENVIRONMENT.get_template(self.name())
    }

    pub fn template(&self) -> &'static str {
        // \n\ at each code line end creates a line break at the proper position and discards further spaces in this line of code.
        // \x20 (hex; 32 in decimal) is an ASCII space and an indicator for the first space to be preserved in this line of the string.
        match self {
            MessageTemplate::Help => {
                "🗒️ Please find below the bot commands handbook.\n\n\
                👉 🆘 *How to*\n\
                ```!help```\n\
                Explains the bot commands. You're currently reading this.\n\n\
                👉 🔎 *Who is this?*\n\
                ```!user <username>```\n\
                Fetches the GitHub profile and contribution statistics of a user.\n\n\
                👉 ➕ *Join the arena*\n\
                ```!add <username>```\n\
                Tracks a GitHub user in this workspace. Adding a user again refreshes their statistics.\n\n\
                👉 ➖ *Leave the arena*\n\
                ```!remove <username>```\n\
                Stops tracking a GitHub user in this workspace.\n\n\
                👉 🏆 *Show me the board!*\n\
                ```!leaderboard [commits|prs|repos|issues]```\n\
                Ranks the tracked users of this workspace. Default is ranking by `commits`."
            }
            MessageTemplate::ProfileCard => {
                // Shared by the profile and added messages
                "*{{ profile.name or profile.handle }}*\
                {{ ' (' ~ profile.pronouns ~ ')' if profile.pronouns }}\n\
                <{{ profile.profile_url }}|{{ profile.handle }}>\
                {{ ' · <' ~ profile.avatar_url ~ '|avatar>' if profile.avatar_url }}\n\
                {%- if profile.bio %}\n{{ profile.bio }}{% endif %}\n\
                {%- if status %}\n> {{ status }}{% endif %}\n\
                \x20 • *Commits:* {{ profile.contributions.commits }}\n\
                \x20 • *Repositories:* {{ profile.contributions.repos }}\n\
                \x20 • *PRs:* {{ profile.contributions.prs }}\n\
                \x20 • *Issues:* {{ profile.contributions.issues }}"
            }
            MessageTemplate::Profile => {
                "{% include 'profile_card.txt' %}"
            }
            MessageTemplate::Added => {
                "{{ '🔁 Already tracked in this workspace, statistics refreshed!' if already_tracked else '✅ Added to this workspace!' }}\n\
                {% include 'profile_card.txt' %}"
            }
            MessageTemplate::Removed => {
                "{% if was_tracked %}🗑️ Deleted *{{ handle }}* from this workspace.\
                {% else %}🤷 *{{ handle }}* was not tracked in this workspace.{% endif %}"
            }
            MessageTemplate::Leaderboard => {
                "📓 *Alltime Leaderboard ({{ label }})*\
                {%- for (marker, handle, value) in standings %}\n\
                {{ marker }} <{{ profile_url }}{{ handle }}|*{{ handle }}*> - *{{ value }}* {{ statistic }}\
                {%- else %}\n\
                Nobody is tracked here yet, use `!add <username>` to get started.\
                {%- endfor %}"
            }
            MessageTemplate::FetchFailed => {
                "❌ Failed to get user info for {{ handle }}"
            }
            MessageTemplate::InvalidCommand => {
                "🤔 {{ reason }}. Type `!help` to see the commands."
            }
            MessageTemplate::Failure => {
                "🚨 Something went wrong while handling your command, please try again later."
            }
        }
    }
}
