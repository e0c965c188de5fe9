use std::fmt;

/// Project formats that can supply a `start` script when none is configured.
///
/// Each inspector looks for one marker file in the working directory and maps
/// it to the command that conventionally starts such a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inspector {
    Npm,
    Docker,
    Make,
}

impl Inspector {
    pub const ALL: [Inspector; 3] = [Inspector::Npm, Inspector::Docker, Inspector::Make];

    /// File whose presence triggers this inspector.
    pub fn marker_file(self) -> &'static str {
        match self {
            Inspector::Npm => "package.json",
            Inspector::Docker => "docker-compose.yml",
            Inspector::Make => "Makefile",
        }
    }

    /// Command the synthesised `start` script runs.
    pub fn start_command(self) -> &'static str {
        match self {
            Inspector::Npm => "npm start",
            Inspector::Docker => "docker-compose up",
            Inspector::Make => "make",
        }
    }

    pub fn for_marker(file_name: &str) -> Option<Inspector> {
        Self::ALL
            .into_iter()
            .find(|inspector| inspector.marker_file() == file_name)
    }
}

impl fmt::Display for Inspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Inspector::Npm => "npm",
            Inspector::Docker => "docker",
            Inspector::Make => "make",
        };
        f.write_str(s)
    }
}

/// Which standard stream of a child process an output writer serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_lookup_round_trips() {
        for inspector in Inspector::ALL {
            assert_eq!(Inspector::for_marker(inspector.marker_file()), Some(inspector));
        }
        assert_eq!(Inspector::for_marker("Cargo.toml"), None);
    }
}
