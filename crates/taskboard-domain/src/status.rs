use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use taskboard_core::TaskboardError;

/// A column visible on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnId {
    ToDo,
    Doing,
    Done,
}

impl ColumnId {
    pub const ALL: [ColumnId; 3] = [ColumnId::ToDo, ColumnId::Doing, ColumnId::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnId::ToDo => "ToDo",
            ColumnId::Doing => "Doing",
            ColumnId::Done => "Done",
        }
    }

    pub fn index(self) -> usize {
        match self {
            ColumnId::ToDo => 0,
            ColumnId::Doing => 1,
            ColumnId::Done => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Column to the right, saturating at `Done`.
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(self)
    }

    /// Column to the left, saturating at `ToDo`.
    pub fn prev(self) -> Self {
        self.index()
            .checked_sub(1)
            .and_then(Self::from_index)
            .unwrap_or(self)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnId {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnId::try_from(StatusName::from_str(s)?)
    }
}

/// Every status a task can hold in the store, including the hidden archive state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusName {
    ToDo,
    Doing,
    Done,
    #[serde(rename = "canceled")]
    Canceled,
}

impl StatusName {
    pub const ALL: [StatusName; 4] = [
        StatusName::ToDo,
        StatusName::Doing,
        StatusName::Done,
        StatusName::Canceled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatusName::ToDo => "ToDo",
            StatusName::Doing => "Doing",
            StatusName::Done => "Done",
            StatusName::Canceled => "canceled",
        }
    }

    pub fn is_visible(self) -> bool {
        self != StatusName::Canceled
    }
}

impl fmt::Display for StatusName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusName {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatusName::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TaskboardError::Validation(format!("Invalid status name: {}", s)))
    }
}

impl From<ColumnId> for StatusName {
    fn from(column: ColumnId) -> Self {
        match column {
            ColumnId::ToDo => StatusName::ToDo,
            ColumnId::Doing => StatusName::Doing,
            ColumnId::Done => StatusName::Done,
        }
    }
}

impl TryFrom<StatusName> for ColumnId {
    type Error = TaskboardError;

    fn try_from(status: StatusName) -> Result<Self, Self::Error> {
        match status {
            StatusName::ToDo => Ok(ColumnId::ToDo),
            StatusName::Doing => Ok(ColumnId::Doing),
            StatusName::Done => Ok(ColumnId::Done),
            StatusName::Canceled => Err(TaskboardError::Validation(
                "canceled tasks are not shown on the board".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&StatusName::Canceled).unwrap(),
            "\"canceled\""
        );
        assert_eq!(serde_json::to_string(&StatusName::ToDo).unwrap(), "\"ToDo\"");
        let parsed: StatusName = serde_json::from_str("\"Doing\"").unwrap();
        assert_eq!(parsed, StatusName::Doing);
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        assert!("Canceled".parse::<StatusName>().is_err());
        assert!("todo".parse::<StatusName>().is_err());
        assert_eq!("canceled".parse::<StatusName>().unwrap(), StatusName::Canceled);
    }

    #[test]
    fn test_column_parse() {
        assert_eq!("Done".parse::<ColumnId>().unwrap(), ColumnId::Done);
        assert!("canceled".parse::<ColumnId>().is_err());
    }

    #[test]
    fn test_column_navigation_saturates() {
        assert_eq!(ColumnId::ToDo.prev(), ColumnId::ToDo);
        assert_eq!(ColumnId::ToDo.next(), ColumnId::Doing);
        assert_eq!(ColumnId::Done.next(), ColumnId::Done);
        assert_eq!(ColumnId::Done.prev(), ColumnId::Doing);
    }
}
