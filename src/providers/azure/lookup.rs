/// Outcome of a single lookup against the Azure DevOps REST API.
///
/// Callers that only care about presence collapse every non-`Found` variant to
/// "skip" through [`Lookup::found`] or [`Lookup::unwrap_or_default`]. The other
/// variants stay inspectable so a run can tell "nothing there" apart from
/// "could not determine".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The resource exists and decoded cleanly.
    Found(T),
    /// The server answered 404, or a list query came back empty.
    NotFound,
    /// The server answered, but the payload was not what we expected.
    Malformed(String),
    /// Every attempt failed, or the status was not worth retrying.
    Failed { attempts: u32, reason: String },
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Lookup::Malformed(_) | Lookup::Failed { .. })
    }

    pub fn map<U, F>(self, f: F) -> Lookup<U>
    where
        F: FnOnce(T) -> U,
    {
        match self.into_result() {
            Ok(value) => Lookup::Found(f(value)),
            Err(miss) => miss,
        }
    }

    /// Splits off the found value, handing back any miss retyped for the caller.
    pub fn into_result<U>(self) -> Result<T, Lookup<U>> {
        match self {
            Lookup::Found(value) => Ok(value),
            Lookup::NotFound => Err(Lookup::NotFound),
            Lookup::Malformed(reason) => Err(Lookup::Malformed(reason)),
            Lookup::Failed { attempts, reason } => Err(Lookup::Failed { attempts, reason }),
        }
    }
}

impl<T: Default> Lookup<T> {
    pub fn unwrap_or_default(self) -> T {
        self.found().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_collapses_misses_to_none() {
        assert_eq!(Lookup::Found(7).found(), Some(7));
        assert_eq!(Lookup::<u64>::NotFound.found(), None);
        assert_eq!(Lookup::<u64>::Malformed("bad".into()).found(), None);
        assert_eq!(
            Lookup::<u64>::Failed {
                attempts: 5,
                reason: "HTTP 500".into()
            }
            .found(),
            None
        );
    }

    #[test]
    fn test_is_failure_only_for_undetermined_outcomes() {
        assert!(!Lookup::Found(1).is_failure());
        assert!(!Lookup::<u8>::NotFound.is_failure());
        assert!(Lookup::<u8>::Malformed("x".into()).is_failure());
        assert!(Lookup::<u8>::Failed {
            attempts: 1,
            reason: "x".into()
        }
        .is_failure());
    }

    #[test]
    fn test_map_keeps_miss_variant() {
        let failed: Lookup<u64> = Lookup::Failed {
            attempts: 3,
            reason: "timeout".into(),
        };
        assert_eq!(
            failed.map(|id| id.to_string()),
            Lookup::Failed {
                attempts: 3,
                reason: "timeout".into()
            }
        );
        assert_eq!(Lookup::Found(2).map(|n| n * 10), Lookup::Found(20));
    }

    #[test]
    fn test_unwrap_or_default_on_empty_outcomes() {
        let projects: Lookup<Vec<String>> = Lookup::NotFound;
        assert!(projects.unwrap_or_default().is_empty());
        let projects = Lookup::Found(vec!["P1".to_string()]);
        assert_eq!(projects.unwrap_or_default(), vec!["P1".to_string()]);
    }
}
