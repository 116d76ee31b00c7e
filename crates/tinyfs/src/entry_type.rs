/// Kind of a node in the filesystem state
///
/// The string forms match what readers of the store receive from
/// `content()`: `dir` for directories and `file` for files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EntryType {
    /// Container of other nodes
    #[serde(rename = "dir")]
    Directory,
    /// Leaf holding structured content
    #[serde(rename = "file")]
    File,
}

impl EntryType {
    /// Convert EntryType to its string form
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Directory => "dir",
            EntryType::File => "file",
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dir" => Ok(EntryType::Directory),
            "file" => Ok(EntryType::File),
            other => Err(format!("Unknown entry type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_string_conversion() {
        assert_eq!(EntryType::File.as_str(), "file");
        assert_eq!(EntryType::Directory.as_str(), "dir");
        assert_eq!(format!("{}", EntryType::Directory), "dir");
    }

    #[test]
    fn test_entry_type_parsing() {
        assert_eq!("file".parse::<EntryType>(), Ok(EntryType::File));
        assert_eq!("dir".parse::<EntryType>(), Ok(EntryType::Directory));
        assert!("symlink".parse::<EntryType>().is_err());
    }

    #[test]
    fn test_serde_serialization() {
        let json = serde_json::to_string(&EntryType::Directory).unwrap();
        assert_eq!(json, "\"dir\"");
        let parsed: EntryType = serde_json::from_str("\"file\"").unwrap();
        assert_eq!(parsed, EntryType::File);
    }
}
