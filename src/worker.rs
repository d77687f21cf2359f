use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::league_fetch::LeagueSource;
use crate::query_cache::QueryKey;
use crate::state::{Delta, FetchCommand};

/// Runs fetches off the UI thread, one at a time, until either channel closes.
pub fn spawn_fetch_worker(
    source: Box<dyn LeagueSource>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<FetchCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        for cmd in cmd_rx {
            let delta = run_command(source.as_ref(), cmd);
            if tx.send(delta).is_err() {
                debug!("ui channel closed, stopping fetch worker");
                break;
            }
        }
    })
}

pub fn run_command(source: &dyn LeagueSource, cmd: FetchCommand) -> Delta {
    match cmd {
        FetchCommand::Query(ticket) => match ticket.key.clone() {
            QueryKey::Leagues => {
                let result = source.fetch_league_list();
                Delta::LeaguesLoaded { ticket, result }
            }
            QueryKey::LeagueSeasons(id) => {
                let result = source.fetch_league_seasons(&id);
                Delta::SeasonLoaded { ticket, result }
            }
        },
        FetchCommand::CheckBadge { url } => {
            let ok = match source.check_badge(&url) {
                Ok(()) => true,
                Err(err) => {
                    warn!("badge check failed for {url}: {err}");
                    false
                }
            };
            Delta::BadgeChecked { url, ok }
        }
    }
}
