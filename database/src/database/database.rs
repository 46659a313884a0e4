use std::{io, thread};

use crate::{
    database::request_manager::{DatabaseRequestAction, DatabaseResponseAction},
    model::{
        person::Person,
        statement::{Statement, StatementResult},
    },
};

use super::{
    options::DatabaseOptions,
    request_manager::{DatabaseRequest, RequestManager},
    table::table::PersonTable,
};

pub struct Database {
    person_table: PersonTable,
    database_options: DatabaseOptions,
}

impl Database {
    pub fn new(options: DatabaseOptions) -> Self {
        Self {
            person_table: PersonTable::new(),
            database_options: options,
        }
    }

    /// Moves the database onto its own thread, requests are processed one at a time
    /// in the order they are received
    pub fn run(mut self) -> io::Result<RequestManager> {
        let (database_sender, database_receiver) = flume::unbounded::<DatabaseRequest>();

        if self.database_options.sample_data {
            for person in Person::sample_data() {
                if let DatabaseResponseAction::Rejected(err) =
                    self.process_statement(Statement::Add(person))
                {
                    log::warn!("Skipped sample person: {}", err);
                }
            }
        }

        log::info!(
            "📀 In-memory database started [Rows: {}]",
            self.person_table.person_rows.len()
        );

        let request_manager =
            RequestManager::new(database_sender, self.database_options.request_timeout);

        thread::Builder::new()
            .name("phonebook-database".to_string())
            .spawn(move || self.process_requests(database_receiver))?;

        Ok(request_manager)
    }

    fn process_requests(&mut self, database_receiver: flume::Receiver<DatabaseRequest>) {
        // Exits once every request manager has been dropped
        while let Ok(DatabaseRequest {
            action,
            response_sender,
            claim,
        }) = database_receiver.recv()
        {
            log::debug!("Received request: {}", action.log_format());

            // The caller already reported a timeout, applying the request now would contradict it
            if !claim.claim() {
                log::debug!("Skipped abandoned request: {}", action.log_format());
                continue;
            }

            let statement = match action {
                DatabaseRequestAction::Request(statement) => statement,
                DatabaseRequestAction::Shutdown => {
                    let _ = response_sender.send(DatabaseResponseAction::Response(
                        StatementResult::SuccessStatus("Successfully shutdown database".to_string()),
                    ));

                    log::info!("📀 In-memory database stopped");

                    return;
                }
            };

            let statement_response = self.process_statement(statement);

            // The request is claimed so the caller is still waiting on this response
            let _ = response_sender.send(statement_response);
        }
    }

    pub fn process_statement(&mut self, statement: Statement) -> DatabaseResponseAction {
        let is_mutation = statement.is_mutation();
        let log_format = statement.log_format();

        match self.person_table.apply(statement) {
            Ok(statement_result) => {
                if is_mutation {
                    log::debug!("✅ Applied: [{}]", log_format);
                }

                DatabaseResponseAction::Response(statement_result)
            }
            Err(err) => {
                log::info!("⚠️  Rejected: [{}] {}", log_format, err);

                DatabaseResponseAction::Rejected(err)
            }
        }
    }
}
