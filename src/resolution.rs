use std::fmt;
use std::str::FromStr;

/// Video resolutions the limiter knows about, ordered low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resolution {
    Sd480,
    Hd720,
    Hd1080,
    Uhd4k,
}

impl Resolution {
    /// Registry in ascending rank order.
    pub const ALL: [Resolution; 4] = [
        Resolution::Sd480,
        Resolution::Hd720,
        Resolution::Hd1080,
        Resolution::Uhd4k,
    ];

    /// Label as reported by Tautulli in `video_resolution`.
    pub fn label(self) -> &'static str {
        match self {
            Resolution::Sd480 => "480",
            Resolution::Hd720 => "720",
            Resolution::Hd1080 => "1080",
            Resolution::Uhd4k => "4k",
        }
    }

    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|res| res.label() == label)
    }

    pub fn allowed_labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|res| res.label()).collect()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_follow_registry_order() {
        let ranks: Vec<usize> = Resolution::ALL.iter().map(|r| r.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
        assert!(Resolution::Sd480 < Resolution::Hd720);
        assert!(Resolution::Hd1080 < Resolution::Uhd4k);
    }

    #[test]
    fn labels_are_exact() {
        assert_eq!(Resolution::from_label("4k"), Some(Resolution::Uhd4k));
        assert_eq!(Resolution::from_label("1080"), Some(Resolution::Hd1080));
        assert_eq!(Resolution::from_label("4K"), None);
        assert_eq!(Resolution::from_label("576"), None);
        assert_eq!(Resolution::from_label("sd"), None);
        assert_eq!("720".parse::<Resolution>(), Ok(Resolution::Hd720));
    }
}
