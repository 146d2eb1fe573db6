use super::*;

#[tokio::test]
async fn static_credentials_track_prompts() {
    let creds = StaticCredentials::new(None).selecting_on_prompt("k-1");
    assert!(!creds.has_selected_key().await);
    creds.open_select_key().await.unwrap();
    assert_eq!(creds.prompt_count(), 1);
    assert_eq!(creds.api_key().as_deref(), Some("k-1"));
}

#[tokio::test]
async fn empty_static_key_is_not_selected() {
    let creds = StaticCredentials::new(Some(String::new()));
    assert!(!creds.has_selected_key().await);
}

#[test]
fn env_credentials_check_custom_var_first() {
    let creds = EnvCredentials::with_var("SOCIALGEN_KEY");
    assert_eq!(creds.vars[0], "SOCIALGEN_KEY");
    assert_eq!(&creds.vars[1..], &["GEMINI_API_KEY", "API_KEY"]);
}
