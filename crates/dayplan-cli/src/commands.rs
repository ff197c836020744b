use anyhow::{bail, Context, Result};
use dayplan_core::{ItemKey, TabState};
use dayplan_engine::{Session, ToggleOutcome};
use tracing::debug;

use crate::config::Command;
use crate::render;

/// Run one command against a started session and return what to print.
pub async fn run(session: &Session, command: &Command) -> Result<String> {
    debug!(?command, "running command");
    match command {
        Command::List => Ok(render::partition(&session.store().partition())),
        Command::Habits => {
            session.switch_tab(TabState::Habits).await?;
            Ok(render::habits(&session.store().partition()))
        }
        Command::Add { kind, title, date } => {
            if let Some(date) = date {
                session.switch_tab(TabState::Calendar).await?;
                session.select_date(*date).await?;
            }
            session.open_add(*kind);
            session.save(title).await?;
            Ok(after_mutation(session))
        }
        Command::Toggle { kind, id } => match session.toggle(*kind, *id).await {
            ToggleOutcome::Applied(_) => Ok(after_mutation(session)),
            ToggleOutcome::Failed(e) => Err(e).context(format!("toggle {kind} #{id}")),
            ToggleOutcome::Dropped => bail!("toggle of {kind} #{id} already in flight"),
        },
        Command::Edit { kind, id, title } => {
            let key = ItemKey::new(*kind, *id);
            if session.store().find(key).is_none() {
                bail!("no {kind} with id {id}");
            }
            session.store().update_item(key, title).await?;
            Ok(after_mutation(session))
        }
        Command::Delete { kind, id } => {
            session.store().delete_item(ItemKey::new(*kind, *id)).await?;
            Ok(after_mutation(session))
        }
        Command::Calendar { date, month } => {
            session.switch_tab(TabState::Calendar).await?;
            if let Some(date) = date {
                session.select_date(*date).await?;
            }
            if *month {
                session.show_month();
            }
            let calendar = session.calendar();
            let mut out = render::calendar(&calendar.render(), calendar.locale());
            let loaded = calendar.date_tasks();
            if let Some(date) = loaded.date {
                out.push('\n');
                out.push_str(&render::date_tasks(date, &loaded.tasks));
            }
            Ok(out)
        }
    }
}

/// What to show once a mutation has gone through: the date list when the
/// calendar is active, the Today view otherwise.
fn after_mutation(session: &Session) -> String {
    if session.active_tab() == TabState::Calendar {
        let loaded = session.calendar().date_tasks();
        if let Some(date) = loaded.date {
            return render::date_tasks(date, &loaded.tasks);
        }
    }
    render::partition(&session.store().partition())
}
