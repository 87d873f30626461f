use crate::ports::routine::{Routine, UpdaterError};

use super::updater::{UpdateTarget, Updater};

/// The scheduled job: one petition count into one cell.
#[derive(Debug)]
pub struct UpdateTallyRoutine {
    updater: Updater,
    target: UpdateTarget,
}

impl UpdateTallyRoutine {
    pub fn new(updater: Updater, target: UpdateTarget) -> Self {
        Self { updater, target }
    }
}

impl Routine for UpdateTallyRoutine {
    fn name(&self) -> &str {
        "update_tally"
    }

    fn run(&self) -> error_stack::Result<(), UpdaterError> {
        let count = self.updater.run(&self.target)?;
        tracing::info!("{} = {}", self.target.range, count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::application::{
        credential_manager::{
            fakes::{FakeRefresher, MemoryStore},
            CredentialManager,
        },
        updater::fakes::{FakePages, FakeSheets},
    };
    use crate::domain::credential::fixtures::{credential, now};
    use crate::domain::sheets::spreadsheet_id::SpreadsheetId;
    use crate::ports::clock::FixedClock;

    #[test]
    fn test_routine_runs_the_updater() {
        let url = "https://www.change.org/p/example";
        let sheets = FakeSheets::default();
        let updater = Updater::new(
            CredentialManager::new(
                Box::new(MemoryStore::with(Some(credential(Some(now() + Duration::hours(1)))))),
                Box::new(FakeRefresher::rejecting()),
                Box::new(FixedClock(now())),
            ),
            Box::new(FakePages::with(url, "99 signatures")),
            Box::new(sheets.clone()),
        );
        let routine = UpdateTallyRoutine::new(
            updater,
            UpdateTarget {
                source_url: url.to_string(),
                spreadsheet_id: SpreadsheetId::parse("abc123").unwrap(),
                range: "B2".parse().unwrap(),
            },
        );

        routine.run().unwrap();

        assert_eq!(routine.name(), "update_tally");
        assert_eq!(sheets.writes.borrow().len(), 1);
    }
}
