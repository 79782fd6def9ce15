//! SQLite-backed history store.
//!
//! Every operation runs as a single statement in autocommit mode with
//! `synchronous=FULL`, so a call that returns `Ok` is durable and a call that
//! fails leaves nothing behind.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info, warn};

use rota_types::ranking::{rank_companions, rank_students};
use rota_types::{
    Assignment, AssignmentDate, AssignmentId, CompanionCandidate, Person, PersonId, PersonName,
    StudentCandidate,
};

use crate::StoreError;
use crate::sqlite_util::{open_secure_db, restrict_sidecars};

/// Durable roster and assignment log.
pub struct HistoryStore {
    db: Connection,
}

impl HistoryStore {
    const SCHEMA: &'static str = r"
        CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            hidden BOOLEAN NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS assignments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            main_student INTEGER NOT NULL REFERENCES students(id),
            assistant_student INTEGER NOT NULL REFERENCES students(id),
            date INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_assignments_main
        ON assignments(main_student);

        CREATE INDEX IF NOT EXISTS idx_assignments_assistant
        ON assignments(assistant_student);
    ";

    /// Open or create the history database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = open_secure_db(path)?;
        let store = Self::initialize(db)
            .with_context(|| format!("Failed to bootstrap history store at {}", path.display()))?;
        restrict_sidecars(path)?;
        info!(path = %path.display(), "History store opened");
        Ok(store)
    }

    /// Open an in-memory history store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory history store")?;
        Self::initialize(db)
    }

    fn initialize(db: Connection) -> Result<Self> {
        db.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL; PRAGMA foreign_keys=ON;",
        )
        .context("Failed to set history store pragmas")?;
        db.execute_batch(Self::SCHEMA)
            .context("Failed to create history store schema")?;
        Ok(Self { db })
    }

    /// Release the connection, reporting any error SQLite raises on close.
    pub fn close(self) -> Result<(), StoreError> {
        self.db
            .close()
            .map_err(|(_, source)| StoreError::Io {
                action: "close the history store",
                source,
            })
    }

    /// Add a person to the roster.
    pub fn add_person(&mut self, name: &str) -> Result<Person, StoreError> {
        let name = PersonName::new(name)?;

        match self
            .db
            .execute("INSERT INTO students (name) VALUES (?1)", [name.as_str()])
        {
            Ok(_) => {}
            Err(err) if constraint_code(&err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) => {
                return Err(StoreError::DuplicateName(name.into_inner()));
            }
            Err(err) => return Err(StoreError::io("add a person")(err)),
        }

        let id = PersonId::new(self.db.last_insert_rowid());
        info!(%id, name = %name, "Person added");
        Ok(Person {
            id,
            name,
            hidden: false,
        })
    }

    /// Set the visibility flag. Setting the current value again is a no-op.
    pub fn set_hidden(&mut self, id: PersonId, hidden: bool) -> Result<(), StoreError> {
        let changed = self
            .db
            .execute(
                "UPDATE students SET hidden = ?1 WHERE id = ?2",
                params![hidden, id.value()],
            )
            .map_err(StoreError::io("update visibility"))?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        debug!(%id, hidden, "Visibility updated");
        Ok(())
    }

    /// Look up a single roster entry, hidden or not.
    pub fn person(&self, id: PersonId) -> Result<Person, StoreError> {
        let raw = self
            .db
            .query_row(
                "SELECT id, name, hidden FROM students WHERE id = ?1",
                [id.value()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(StoreError::io("look up a person"))?
            .ok_or(StoreError::NotFound(id))?;

        let (id, name, hidden) = raw;
        Ok(Person {
            id: PersonId::new(id),
            name: PersonName::new(name)?,
            hidden,
        })
    }

    /// Visible people, longest idle first.
    pub fn list_eligible_students(&self) -> Result<Vec<StudentCandidate>, StoreError> {
        let mut candidates = self.students_with_activity(false)?;
        rank_students(&mut candidates);
        Ok(candidates)
    }

    /// Hidden people, by name, with their last activity.
    pub fn list_hidden_people(&self) -> Result<Vec<StudentCandidate>, StoreError> {
        let mut candidates = self.students_with_activity(true)?;
        candidates.sort_by(|a, b| {
            a.person
                .name
                .cmp(&b.person.name)
                .then_with(|| a.person.id.cmp(&b.person.id))
        });
        Ok(candidates)
    }

    fn students_with_activity(&self, hidden: bool) -> Result<Vec<StudentCandidate>, StoreError> {
        self.warn_on_invalid_dates()?;

        let mut stmt = self
            .db
            .prepare(
                "SELECT s.id, s.name, s.hidden, MAX(a.date)
                 FROM students s
                 LEFT JOIN (
                     SELECT main_student AS student_id, date FROM assignments
                     WHERE date BETWEEN 0 AND 99999999
                     UNION ALL
                     SELECT assistant_student AS student_id, date FROM assignments
                     WHERE date BETWEEN 0 AND 99999999
                 ) a ON a.student_id = s.id
                 WHERE s.hidden = ?1
                 GROUP BY s.id, s.name, s.hidden",
            )
            .map_err(StoreError::io("prepare the student query"))?;

        let rows = stmt
            .query_map([hidden], |row| {
                Ok((RawPerson::from_row(row)?, row.get::<_, Option<i64>>(3)?))
            })
            .map_err(StoreError::io("list students"))?;

        let mut candidates = Vec::new();
        for row in rows {
            let scanned = row.map_err(|e| e.to_string()).and_then(|(raw, last)| {
                Ok(StudentCandidate {
                    person: raw.into_person()?,
                    last_activity: stored_date(last)?,
                })
            });
            match scanned {
                Ok(candidate) => candidates.push(candidate),
                Err(reason) => warn!(%reason, "Skipping unreadable student row"),
            }
        }
        Ok(candidates)
    }

    /// Visible people other than `main`, longest unpaired with `main` first.
    pub fn list_eligible_companions(
        &self,
        main: PersonId,
    ) -> Result<Vec<CompanionCandidate>, StoreError> {
        self.ensure_exists(main)?;
        self.warn_on_invalid_dates()?;

        let mut stmt = self
            .db
            .prepare(
                "SELECT s.id, s.name, s.hidden,
                     (SELECT MAX(date) FROM assignments
                      WHERE ((main_student = ?1 AND assistant_student = s.id)
                         OR (main_student = s.id AND assistant_student = ?1))
                        AND date BETWEEN 0 AND 99999999),
                     (SELECT MAX(date) FROM assignments
                      WHERE (main_student = s.id OR assistant_student = s.id)
                        AND date BETWEEN 0 AND 99999999)
                 FROM students s
                 WHERE s.id != ?1 AND s.hidden = 0",
            )
            .map_err(StoreError::io("prepare the companion query"))?;

        let rows = stmt
            .query_map([main.value()], |row| {
                Ok((
                    RawPerson::from_row(row)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, Option<i64>>(4)?,
                ))
            })
            .map_err(StoreError::io("list companions"))?;

        let mut candidates = Vec::new();
        for row in rows {
            let scanned = row
                .map_err(|e| e.to_string())
                .and_then(|(raw, paired, last)| {
                    Ok(CompanionCandidate {
                        person: raw.into_person()?,
                        last_paired: stored_date(paired)?,
                        last_activity: stored_date(last)?,
                    })
                });
            match scanned {
                Ok(candidate) => candidates.push(candidate),
                Err(reason) => warn!(%reason, "Skipping unreadable companion row"),
            }
        }

        rank_companions(&mut candidates);
        Ok(candidates)
    }

    /// Append an assignment. Repeats of the same pair and date are allowed.
    pub fn record_assignment(
        &mut self,
        main: PersonId,
        assistant: PersonId,
        date: AssignmentDate,
    ) -> Result<Assignment, StoreError> {
        if main == assistant {
            return Err(StoreError::SamePerson(main));
        }

        match self.db.execute(
            "INSERT INTO assignments (main_student, assistant_student, date)
             VALUES (?1, ?2, ?3)",
            params![main.value(), assistant.value(), i64::from(date.value())],
        ) {
            Ok(_) => {}
            Err(err)
                if constraint_code(&err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY) =>
            {
                return Err(StoreError::ForeignKey { main, assistant });
            }
            Err(err) => return Err(StoreError::io("record an assignment")(err)),
        }

        let id = AssignmentId::new(self.db.last_insert_rowid());
        info!(%id, %main, %assistant, %date, "Assignment recorded");
        Ok(Assignment {
            id,
            main,
            assistant,
            date,
        })
    }

    /// Assignments a person took part in (either slot), newest first.
    pub fn assignments_for(&self, person: PersonId) -> Result<Vec<Assignment>, StoreError> {
        self.ensure_exists(person)?;

        let mut stmt = self
            .db
            .prepare(
                "SELECT id, main_student, assistant_student, date
                 FROM assignments
                 WHERE main_student = ?1 OR assistant_student = ?1
                 ORDER BY date DESC, id DESC",
            )
            .map_err(StoreError::io("prepare the assignment query"))?;

        let rows = stmt
            .query_map([person.value()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(StoreError::io("list assignments"))?;

        let mut assignments = Vec::new();
        for row in rows {
            let scanned = row
                .map_err(|e| e.to_string())
                .and_then(|(id, main, assistant, date)| {
                    let date = AssignmentDate::from_stored(date)
                        .ok_or_else(|| format!("stored date {date} is not YYYYMMDD"))?;
                    Ok(Assignment {
                        id: AssignmentId::new(id),
                        main: PersonId::new(main),
                        assistant: PersonId::new(assistant),
                        date,
                    })
                });
            match scanned {
                Ok(assignment) => assignments.push(assignment),
                Err(reason) => warn!(%reason, "Skipping unreadable assignment row"),
            }
        }
        Ok(assignments)
    }

    /// Assignments whose date cannot be a `YYYYMMDD` value are left out of
    /// the activity aggregates. The people involved stay listed.
    fn warn_on_invalid_dates(&self) -> Result<(), StoreError> {
        let invalid: i64 = self
            .db
            .query_row(
                "SELECT COUNT(*) FROM assignments WHERE date NOT BETWEEN 0 AND 99999999",
                [],
                |row| row.get(0),
            )
            .map_err(StoreError::io("count invalid assignment dates"))?;
        if invalid > 0 {
            warn!(invalid, "Ignoring assignments with invalid stored dates");
        }
        Ok(())
    }

    fn ensure_exists(&self, id: PersonId) -> Result<(), StoreError> {
        self.db
            .query_row("SELECT 1 FROM students WHERE id = ?1", [id.value()], |_| {
                Ok(())
            })
            .optional()
            .map_err(StoreError::io("look up a person"))?
            .ok_or(StoreError::NotFound(id))
    }
}

/// Person columns as read, before validation.
struct RawPerson {
    id: i64,
    name: String,
    hidden: bool,
}

impl RawPerson {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            hidden: row.get(2)?,
        })
    }

    fn into_person(self) -> Result<Person, String> {
        let name = PersonName::new(self.name)
            .map_err(|e| format!("person {}: {e}", self.id))?;
        Ok(Person {
            id: PersonId::new(self.id),
            name,
            hidden: self.hidden,
        })
    }
}

fn stored_date(raw: Option<i64>) -> Result<Option<AssignmentDate>, String> {
    match raw {
        None => Ok(None),
        Some(value) => AssignmentDate::from_stored(value)
            .map(Some)
            .ok_or_else(|| format!("stored date {value} is not YYYYMMDD")),
    }
}

fn constraint_code(err: &rusqlite::Error) -> Option<std::ffi::c_int> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            Some(e.extended_code)
        }
        _ => None,
    }
}
