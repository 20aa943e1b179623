use super::*;

/// # Safety
/// Env is process-global; every test here takes `ENV_LOCK` first.
unsafe fn clear_env() {
    unsafe {
        for key in URL_VARS.iter().chain(KEY_VARS.iter()) {
            std::env::remove_var(key);
        }
        std::env::remove_var("TODO_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("TODO_CONNECT_TIMEOUT_SECS");
    }
}

static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[test]
fn from_env_reads_required_values_and_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("SUPABASE_URL", "https://demo.supabase.co/");
        std::env::set_var("SUPABASE_ANON_KEY", "anon-key");
    }

    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.supabase_url, "https://demo.supabase.co");
    assert_eq!(cfg.anon_key, "anon-key");
    assert_eq!(cfg.timeouts, Timeouts::default());

    unsafe { clear_env() };
}

#[test]
fn from_env_accepts_vite_fallbacks_and_timeouts() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("VITE_SUPABASE_URL", "http://localhost:54321");
        std::env::set_var("VITE_SUPABASE_ANON_KEY", "vite-key");
        std::env::set_var("TODO_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("TODO_CONNECT_TIMEOUT_SECS", "2");
    }

    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.supabase_url, "http://localhost:54321");
    assert_eq!(cfg.anon_key, "vite-key");
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 5, connect_secs: 2 });

    unsafe { clear_env() };
}

#[test]
fn from_env_missing_url_is_fatal() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("SUPABASE_ANON_KEY", "anon-key");
    }

    let err = AppConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Missing { var: "SUPABASE_URL" }));

    unsafe { clear_env() };
}

#[test]
fn from_env_blank_key_counts_as_missing() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("SUPABASE_URL", "https://demo.supabase.co");
        std::env::set_var("SUPABASE_ANON_KEY", "   ");
    }

    let err = AppConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("SUPABASE_ANON_KEY"));

    unsafe { clear_env() };
}

#[test]
fn from_env_rejects_non_http_url() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("SUPABASE_URL", "demo.supabase.co");
        std::env::set_var("SUPABASE_ANON_KEY", "anon-key");
    }

    let err = AppConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    unsafe { clear_env() };
}

#[test]
fn env_parse_u64_falls_back_on_garbage() {
    let key = "__TEST_TODO_TIMEOUT_GARBAGE_118__";
    unsafe { std::env::set_var(key, "soon") };
    assert_eq!(env_parse_u64(key, 9), 9);
    unsafe { std::env::remove_var(key) };
}

// =============================================================================
// .env loading
// =============================================================================

#[test]
fn dotenv_missing_file_is_absent() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let path = std::env::temp_dir().join(format!("todo-client-{}.env", uuid::Uuid::new_v4()));

    let outcome = DotEnv::from_result(dotenvy::from_path(&path).map(|()| path.clone()));

    assert!(matches!(outcome, DotEnv::Absent));
}

#[test]
fn dotenv_malformed_file_is_invalid() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let path = std::env::temp_dir().join(format!("todo-client-{}.env", uuid::Uuid::new_v4()));
    std::fs::write(&path, "not a valid line\n").unwrap();

    let outcome = DotEnv::from_result(dotenvy::from_path(&path).map(|()| path.clone()));

    assert!(matches!(outcome, DotEnv::Invalid(_)));
    std::fs::remove_file(&path).unwrap();
}
