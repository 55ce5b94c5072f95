use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::arguments::MySqlArgument;
use crate::column::MySqlColumn;
use crate::connection::MySqlConnection;
use crate::done::MySqlDone;
use crate::error::{Error, Result};
use crate::protocol::{
    is_eof_packet, ColumnCount, ColumnDefinition, ComQuery, ComStmtClose, ComStmtExecute,
    ComStmtPrepare, ComStmtPrepareOk, ComStmtReset, ComStmtSendLongData, Decode, EofPacket,
    MySqlRow, OkPacket, Status,
};
use crate::statement::MySqlStatement;

/// The first response packet of a statement: either an immediate OK or the
/// column count of a result set.
enum ResultSetHeader {
    Ok(OkPacket),
    Columns(u64),
}

impl<S> MySqlConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Runs `sql` over the text protocol and returns the summary of the
    /// last result, draining any result sets the statement produces.
    pub async fn execute(&mut self, sql: &str) -> Result<MySqlDone> {
        self.ensure_open()?;

        log::debug!("executing {:?}", sql);

        self.send_command(ComQuery { query: sql }).await?;
        self.drain_results().await
    }

    /// Runs `sql` over the text protocol and streams the first result set.
    pub async fn fetch(&mut self, sql: &str) -> Result<MySqlResultSet<'_, S>> {
        self.ensure_open()?;

        log::debug!("fetching {:?}", sql);

        self.send_command(ComQuery { query: sql }).await?;
        self.result = MySqlDone::default();
        self.begin_result_set(false).await
    }

    /// Prepares `sql`, returning a statement handle tied to this session.
    pub async fn prepare(&mut self, sql: &str) -> Result<MySqlStatement> {
        self.ensure_open()?;

        log::debug!("preparing {:?}", sql);

        self.send_command(ComStmtPrepare { query: sql }).await?;

        let payload = self.stream.recv().await?;
        let ok = match payload.first() {
            Some(&0x00) => match ComStmtPrepareOk::decode(&payload) {
                Ok(ok) => ok,
                Err(err) => return Err(self.stream.poison(err)),
            },

            Some(&0xFF) => return Err(self.stream.handle_err(&payload)),

            Some(id) => {
                return Err(self.stream.poison(err_protocol!(
                    "expected COM_STMT_PREPARE_OK (0x00) or ERR (0xFF); received 0x{:X}",
                    id
                )));
            }

            None => {
                return Err(self
                    .stream
                    .poison(err_protocol!("empty reply to COM_STMT_PREPARE")));
            }
        };

        if ok.warnings > 0 {
            log::debug!("prepare reported {} warnings", ok.warnings);
        }

        // parameter definitions, then column definitions; each block is
        // terminated by an EOF and carries nothing we use
        if ok.params > 0 {
            self.read_until_eof().await?;
        }

        if ok.columns > 0 {
            self.read_until_eof().await?;
        }

        Ok(MySqlStatement {
            statement_id: ok.statement_id,
            param_count: ok.params,
            column_count: ok.columns,
            session: Arc::downgrade(&self.stream.shared),
        })
    }

    /// Executes a prepared statement and returns the summary of the last
    /// result, draining any result sets.
    pub async fn execute_statement(
        &mut self,
        statement: &MySqlStatement,
        args: &[MySqlArgument<'_>],
    ) -> Result<MySqlDone> {
        self.start_execute(statement, args).await?;
        self.drain_results().await
    }

    /// Executes a prepared statement and streams its first (binary-encoded)
    /// result set.
    pub async fn fetch_statement(
        &mut self,
        statement: &MySqlStatement,
        args: &[MySqlArgument<'_>],
    ) -> Result<MySqlResultSet<'_, S>> {
        self.start_execute(statement, args).await?;
        self.result = MySqlDone::default();
        self.begin_result_set(true).await
    }

    /// Discards server-side state accumulated for a statement, including
    /// any long data.
    pub async fn reset_statement(&mut self, statement: &MySqlStatement) -> Result<()> {
        self.ensure_open()?;
        statement.validate(&self.stream.shared)?;

        self.send_command(ComStmtReset {
            statement_id: statement.statement_id,
        })
        .await?;
        self.stream.recv_ok().await?;

        Ok(())
    }

    /// Deallocates a statement on the server. No reply is sent; closing a
    /// statement whose session is already gone is a quiet no-op.
    pub async fn close_statement(&mut self, statement: MySqlStatement) -> Result<()> {
        if statement.validate(&self.stream.shared).is_err() {
            return Ok(());
        }

        self.send_command(ComStmtClose {
            statement_id: statement.statement_id,
        })
        .await
    }

    async fn start_execute(
        &mut self,
        statement: &MySqlStatement,
        args: &[MySqlArgument<'_>],
    ) -> Result<()> {
        self.ensure_open()?;
        statement.validate(&self.stream.shared)?;

        if args.len() != statement.param_count() {
            return Err(Error::ParamCountMismatch {
                expected: statement.param_count(),
                actual: args.len(),
            });
        }

        // values too large to inline in the execute packet are shipped
        // ahead of it, one COM_STMT_SEND_LONG_DATA command per chunk
        let threshold = (self.max_allowed_packet / (args.len() + 1)).max(64);

        let mut long_data = vec![false; args.len()];
        for (i, arg) in args.iter().enumerate() {
            if let Some(bytes) = arg.as_bytes() {
                if bytes.len() >= threshold {
                    self.send_long_data(statement.statement_id, i as u16, bytes)
                        .await?;
                    long_data[i] = true;
                }
            }
        }

        self.send_command(ComStmtExecute {
            statement_id: statement.statement_id,
            args,
            long_data: &long_data,
        })
        .await
    }

    async fn send_long_data(
        &mut self,
        statement_id: u32,
        param_id: u16,
        mut data: &[u8],
    ) -> Result<()> {
        let chunk_size = self.max_allowed_packet.saturating_sub(1).max(1);

        while !data.is_empty() {
            let n = data.len().min(chunk_size);

            self.send_command(ComStmtSendLongData {
                statement_id,
                param_id,
                data: &data[..n],
            })
            .await?;

            data = &data[n..];
        }

        Ok(())
    }

    /// Reads every remaining response of the current command, following
    /// the multi-result chain, and returns the last summary.
    async fn drain_results(&mut self) -> Result<MySqlDone> {
        self.result = MySqlDone::default();

        loop {
            match self.read_result_set_header().await? {
                ResultSetHeader::Ok(ok) => self.record_ok(&ok),

                ResultSetHeader::Columns(_) => {
                    // column definitions, then the row stream
                    self.read_until_eof().await?;
                    self.read_until_eof().await?;
                }
            }

            if !self
                .stream
                .status
                .contains(Status::SERVER_MORE_RESULTS_EXISTS)
            {
                break;
            }
        }

        Ok(self.result)
    }

    async fn begin_result_set(&mut self, binary: bool) -> Result<MySqlResultSet<'_, S>> {
        match self.read_result_set_header().await? {
            ResultSetHeader::Ok(ok) => {
                self.record_ok(&ok);

                Ok(MySqlResultSet {
                    columns: Vec::new(),
                    binary,
                    done: true,
                    conn: self,
                })
            }

            ResultSetHeader::Columns(count) => {
                let columns = self.read_columns(count).await?;

                Ok(MySqlResultSet {
                    columns,
                    binary,
                    done: false,
                    conn: self,
                })
            }
        }
    }

    async fn read_result_set_header(&mut self) -> Result<ResultSetHeader> {
        let payload = self.stream.recv().await?;

        match payload.first() {
            Some(&0x00) => Ok(ResultSetHeader::Ok(self.stream.handle_ok(&payload)?)),

            Some(&0xFF) => Err(self.stream.handle_err(&payload)),

            // 0xFB would start the LOCAL INFILE sub-protocol
            Some(&0xFB) => Err(self
                .stream
                .poison(err_protocol!("LOAD DATA LOCAL INFILE is not supported"))),

            Some(_) => match ColumnCount::decode(&payload) {
                Ok(count) => Ok(ResultSetHeader::Columns(count.columns)),
                Err(err) => Err(self.stream.poison(err)),
            },

            None => Err(self
                .stream
                .poison(err_protocol!("empty result-set header packet"))),
        }
    }

    /// Skips packets until the EOF (or ERR) that terminates a definition
    /// or row block.
    async fn read_until_eof(&mut self) -> Result<EofPacket> {
        loop {
            let payload = self.stream.recv().await?;

            match payload.first() {
                Some(&0xFF) => return Err(self.stream.handle_err(&payload)),

                _ if is_eof_packet(&payload) => return self.stream.handle_eof(&payload),

                Some(_) => {}

                None => {
                    return Err(self
                        .stream
                        .poison(err_protocol!("empty packet in result stream")));
                }
            }
        }
    }

    async fn read_columns(&mut self, count: u64) -> Result<Vec<MySqlColumn>> {
        let mut columns = Vec::with_capacity(count.min(64) as usize);

        loop {
            let payload = self.stream.recv().await?;

            match payload.first() {
                Some(&0xFF) => return Err(self.stream.handle_err(&payload)),

                _ if is_eof_packet(&payload) => {
                    self.stream.handle_eof(&payload)?;

                    if columns.len() as u64 != count {
                        return Err(self.stream.poison(Error::ColumnCountMismatch {
                            expected: count,
                            actual: columns.len() as u64,
                        }));
                    }

                    return Ok(columns);
                }

                Some(_) => match ColumnDefinition::decode(&payload) {
                    Ok(def) => columns.push(def.into()),
                    Err(err) => return Err(self.stream.poison(err)),
                },

                None => {
                    return Err(self
                        .stream
                        .poison(err_protocol!("empty packet in column definitions")));
                }
            }
        }
    }

    fn record_ok(&mut self, ok: &OkPacket) {
        self.result = MySqlDone {
            rows_affected: ok.affected_rows,
            last_insert_id: ok.last_insert_id,
        };
    }
}

/// A streaming result set borrowed from its connection.
///
/// Rows are pulled lazily with [`next`][Self::next]; the stream ends at
/// the set's trailing EOF. When the server flags
/// `SERVER_MORE_RESULTS_EXISTS`, [`next_result_set`][Self::next_result_set]
/// advances to the following set.
pub struct MySqlResultSet<'c, S> {
    conn: &'c mut MySqlConnection<S>,
    columns: Vec<MySqlColumn>,
    binary: bool,
    done: bool,
}

impl<S> MySqlResultSet<'_, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn columns(&self) -> &[MySqlColumn] {
        &self.columns
    }

    /// The next row, or `None` at the end of the current result set.
    pub async fn next(&mut self) -> Result<Option<MySqlRow>> {
        if self.done {
            return Ok(None);
        }

        let payload = self.conn.stream.recv().await?;

        match payload.first() {
            Some(&0xFF) => {
                self.done = true;

                Err(self.conn.stream.handle_err(&payload))
            }

            _ if is_eof_packet(&payload) => {
                self.conn.stream.handle_eof(&payload)?;
                self.done = true;

                Ok(None)
            }

            Some(_) => {
                let row = if self.binary {
                    MySqlRow::decode_binary(payload, &self.columns)
                } else {
                    MySqlRow::decode_text(payload, self.columns.len())
                };

                match row {
                    Ok(row) => Ok(Some(row)),
                    Err(err) => Err(self.conn.stream.poison(err)),
                }
            }

            None => Err(self
                .conn
                .stream
                .poison(err_protocol!("empty packet in row stream"))),
        }
    }

    /// Advances to the next result set, draining any unread rows of the
    /// current one first. Returns `false` when the chain is exhausted.
    pub async fn next_result_set(&mut self) -> Result<bool> {
        while self.next().await?.is_some() {}

        if !self
            .conn
            .stream
            .status
            .contains(Status::SERVER_MORE_RESULTS_EXISTS)
        {
            return Ok(false);
        }

        match self.conn.read_result_set_header().await? {
            ResultSetHeader::Ok(ok) => {
                self.conn.record_ok(&ok);
                self.columns.clear();
                self.done = true;
            }

            ResultSetHeader::Columns(count) => {
                self.columns = self.conn.read_columns(count).await?;
                self.done = false;
            }
        }

        Ok(true)
    }
}
