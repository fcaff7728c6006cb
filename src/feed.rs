// Upstream data provider interface: a finite, restartable sequence of typed
// records to enter. The driver only iterates; schema validation belongs to
// the provider.

use std::collections::HashMap;

use crate::errors::DriverResult;

/// One typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Empty,
}

/// A flat field-name to value mapping, one row of data entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub fields: HashMap<String, FieldValue>,
}

impl Record {
    pub fn set(&mut self, name: &str, value: FieldValue) -> &mut Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// Finite, restartable record sequence.
pub trait RecordSource {
    /// Rewind to the first record.
    fn restart(&mut self) -> DriverResult<()>;

    /// Next record, `None` once exhausted.
    fn next_record(&mut self) -> DriverResult<Option<Record>>;
}

/// In-memory source, for tests and small batches.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    records: Vec<Record>,
    cursor: usize,
}

impl VecSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records, cursor: 0 }
    }
}

impl RecordSource for VecSource {
    fn restart(&mut self) -> DriverResult<()> {
        self.cursor = 0;
        Ok(())
    }

    fn next_record(&mut self) -> DriverResult<Option<Record>> {
        let record = self.records.get(self.cursor).cloned();
        if record.is_some() {
            self.cursor += 1;
        }
        Ok(record)
    }
}
