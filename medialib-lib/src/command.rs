//! The typed command every operation arrives as.

use medialib_core::{
    ApiVersion, MediaLibError, MediaUri, OperationObject, Value, ValuesBucket, columns,
};

/// Values key naming the descriptor a Close applies to.
pub const FD_KEY: &str = "fd";

/// Values key carrying the open mode when Open arrives through `handle`.
pub const MODE_KEY: &str = "mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Create,
    Delete,
    Update,
    Query,
    Open,
    Close,
    Trash,
    Recover,
}

impl OperationType {
    /// Whether the operation changes the index or the tree.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Query | Self::Open)
    }
}

/// A conjunction of `column = ?` filters with bound arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicates {
    clauses: Vec<String>,
    args: Vec<Value>,
}

impl Predicates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column = value`. Only known asset and album columns are accepted.
    pub fn equal_to(mut self, column: &str, value: impl Into<Value>) -> Result<Self, MediaLibError> {
        if !columns::is_asset_column(column)
            && column != columns::ALBUM_ID
            && column != columns::ALBUM_NAME
        {
            return Err(MediaLibError::invalid_values(format!(
                "unknown predicate column '{column}'"
            )));
        }
        self.args.push(value.into());
        self.clauses.push(format!("{} = ?{}", column, self.args.len()));
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn where_clause(&self) -> Option<String> {
        if self.clauses.is_empty() {
            None
        } else {
            Some(self.clauses.join(" AND "))
        }
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Bound value of the first `column = ?` filter, if any.
    pub fn value_of(&self, column: &str) -> Option<&Value> {
        let prefix = format!("{column} = ?");
        self.clauses
            .iter()
            .position(|c| c.starts_with(&prefix))
            .and_then(|i| self.args.get(i))
    }
}

#[derive(Debug, Clone)]
pub struct MediaLibraryCommand {
    pub object: OperationObject,
    pub operation: OperationType,
    pub api: ApiVersion,
    pub values: ValuesBucket,
    pub predicates: Predicates,
    pub uri: Option<MediaUri>,
}

impl MediaLibraryCommand {
    pub fn new(object: OperationObject, operation: OperationType, api: ApiVersion) -> Self {
        Self {
            object,
            operation,
            api,
            values: ValuesBucket::new(),
            predicates: Predicates::new(),
            uri: None,
        }
    }

    /// Build a command addressed at an existing asset.
    pub fn for_uri(uri: MediaUri, operation: OperationType, api: ApiVersion) -> Self {
        let mut cmd = Self::new(uri.object, operation, api);
        cmd.uri = Some(uri);
        cmd
    }

    pub fn with_values(mut self, values: ValuesBucket) -> Self {
        self.values = values;
        self
    }

    pub fn with_predicates(mut self, predicates: Predicates) -> Self {
        self.predicates = predicates;
        self
    }

    /// Target id: from the URI, else the values, else an id predicate.
    pub fn file_id(&self) -> Option<i64> {
        let id_column = if self.object == OperationObject::Album {
            columns::ALBUM_ID
        } else {
            columns::FILE_ID
        };
        self.uri
            .map(|u| u.id)
            .or_else(|| self.values.get_i64(id_column))
            .or_else(|| self.predicates.value_of(id_column).and_then(Value::as_i64))
            .or_else(|| {
                self.predicates
                    .value_of(id_column)
                    .and_then(Value::as_str)
                    .and_then(|s| s.parse().ok())
            })
    }

    /// Like [`file_id`](Self::file_id) but errors with `InvalidFileId`.
    pub fn require_file_id(&self) -> Result<i64, MediaLibError> {
        self.file_id()
            .filter(|id| *id > 0)
            .ok_or_else(|| MediaLibError::InvalidFileId(format!("{:?} has no target id", self.operation)))
    }

    pub fn target_uri(&self) -> Result<MediaUri, MediaLibError> {
        Ok(MediaUri::new(self.object, self.require_file_id()?))
    }
}
