use navguard::session::{
    self, AUTH_STATE_KEY, FileSessionStore, InMemorySessionStore, SessionStore,
};

#[cfg(test)]
mod flag_tests {
    use super::*;

    #[test]
    fn test_only_exact_true_authenticates() {
        assert!(session::parse_flag(Some("true")));
        assert!(!session::parse_flag(Some("false")));
        assert!(!session::parse_flag(None));
        // Values outside the boolean pair fail closed.
        for value in ["TRUE", "True", "1", "yes", "", " true"] {
            assert!(!session::parse_flag(Some(value)), "{value:?} must not authenticate");
        }
    }

    #[tokio::test]
    async fn test_load_context_reads_stored_flag() {
        let store = InMemorySessionStore::with_flag("true");
        let context = session::load_context(&store).await.unwrap();
        assert!(context.authenticated);

        let store = InMemorySessionStore::with_flag("maybe");
        let context = session::load_context(&store).await.unwrap();
        assert!(!context.authenticated);
    }
}

#[cfg(test)]
mod memory_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_logout_lifecycle() {
        let store = InMemorySessionStore::new();
        assert!(!session::load_context(&store).await.unwrap().authenticated);

        session::mark_authenticated(&store).await.unwrap();
        assert_eq!(store.get(AUTH_STATE_KEY).await.unwrap().as_deref(), Some("true"));
        assert!(session::load_context(&store).await.unwrap().authenticated);

        session::clear(&store).await.unwrap();
        assert_eq!(store.get(AUTH_STATE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ok() {
        let store = InMemorySessionStore::new();
        assert!(store.remove("absent").await.is_ok());
    }
}

#[cfg(test)]
mod file_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        assert_eq!(store.get(AUTH_STATE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_flag_survives_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("session.json");

        let store = FileSessionStore::new(&path);
        session::mark_authenticated(&store).await.unwrap();
        store.set("theme", "dark").await.unwrap();

        // A restarted service opens the same file.
        let reopened = FileSessionStore::new(&path);
        assert!(session::load_context(&reopened).await.unwrap().authenticated);
        assert_eq!(reopened.get("theme").await.unwrap().as_deref(), Some("dark"));

        session::clear(&reopened).await.unwrap();
        assert_eq!(store.get(AUTH_STATE_KEY).await.unwrap(), None);
        assert_eq!(store.get("theme").await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();

        let store = FileSessionStore::new(&path);
        let result = store.get(AUTH_STATE_KEY).await;
        assert!(matches!(result, Err(navguard::error::SessionError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_store_path_ending_in_tmp_keeps_its_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.tmp");

        let store = FileSessionStore::new(&path);
        session::mark_authenticated(&store).await.unwrap();
        store.set("theme", "dark").await.unwrap();

        assert!(path.exists());
        let reopened = FileSessionStore::new(&path);
        assert!(session::load_context(&reopened).await.unwrap().authenticated);
        assert_eq!(reopened.get("theme").await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_concurrent_writes_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.set("stale", "yes").await.unwrap();

        let (a, b, c, d, e, removed) = tokio::join!(
            store.set("a", "1"),
            store.set("b", "2"),
            store.set("c", "3"),
            store.set(AUTH_STATE_KEY, "true"),
            store.set("e", "5"),
            store.remove("stale"),
        );
        for result in [a, b, c, d, e, removed] {
            result.unwrap();
        }

        let reopened = FileSessionStore::new(store.path());
        let expected = [("a", "1"), ("b", "2"), ("c", "3"), (AUTH_STATE_KEY, "true"), ("e", "5")];
        for (key, value) in expected {
            assert_eq!(reopened.get(key).await.unwrap().as_deref(), Some(value), "{key}");
        }
        assert_eq!(reopened.get("stale").await.unwrap(), None);
    }
}
