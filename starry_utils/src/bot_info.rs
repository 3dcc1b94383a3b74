use once_cell::sync::OnceCell;
use serenity::http::Http;
use serenity::model::prelude::UserId;
use std::collections::HashSet;

/// The struct to hold the information found from the application so that we can set it to a static to avoid API requests
#[derive(Debug)]
pub struct BotInfo {
    owners: HashSet<UserId>,
    user: UserId,
    name: String,
}

/// The static to hold `BotInfo`, so that it's global
static BOT_INFO: OnceCell<BotInfo> = OnceCell::new();

impl BotInfo {
    /// Fetches the application info. Owners are the application owner plus every team member.
    pub async fn set(http: &Http) -> serenity::Result<&'static BotInfo> {
        let app_info = http.get_current_application_info().await?;
        let current_user = http.get_current_user().await?;

        let mut owners: HashSet<UserId> = app_info.owner.iter().map(|u| u.id).collect();
        if let Some(team) = &app_info.team {
            owners.extend(team.members.iter().map(|m| m.user.id));
        }

        let info = BotInfo {
            owners,
            user: current_user.id,
            name: current_user.name.clone(),
        };

        Ok(BOT_INFO.get_or_init(|| info))
    }

    pub fn owners(&self) -> &HashSet<UserId> {
        &self.owners
    }
    pub fn user(&self) -> UserId {
        self.user
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}
