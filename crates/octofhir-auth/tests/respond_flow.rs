use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, Validation, decode};
use octofhir_auth::prelude::*;
use octofhir_auth::oauth::RESPONSE_PARAM;
use serde_json::{Map, Value};
use time::Duration;
use url::Url;

const ISSUER: &str = "https://auth.example.com";
const REDIRECT: &str = "https://app.example.com/cb";

struct FixedProcessor {
    params: ResponseParameters,
    calls: AtomicU32,
}

impl FixedProcessor {
    fn new(params: ResponseParameters) -> Self {
        Self {
            params,
            calls: AtomicU32::new(0),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthorizationProcessor for FixedProcessor {
    async fn process(&self, _ctx: &AuthorizationContext) -> AuthResult<ResponseParameters> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.params.clone())
    }
}

fn context(client: Client, response_type: &str, response_mode: Option<&str>) -> AuthorizationContext {
    let params = AuthorizationParams {
        client_id: client.client_id.clone(),
        redirect_uri: REDIRECT.to_string(),
        response_type: response_type.to_string(),
        state: Some("abc123".to_string()),
        response_mode: response_mode.map(str::to_string),
        nonce: None,
    };
    AuthorizationContext::new(client, params).expect("valid context")
}

fn single_tenant(storage: Arc<InMemoryParStorage>) -> AuthorizationResponder {
    AuthorizationResponder::new(storage, Arc::new(StaticIssuer::new(ISSUER)), ResponseModes::new())
}

fn tenancy_config() -> AuthConfig {
    AuthConfig::from_toml_str(
        r#"
        [auth]
        issuer = "https://auth.example.com"

        [auth.tenancy]
        enabled = true
        issuer_template = "https://auth.example.com/tenants/{tenant}"

        [auth.tenancy.issuers]
        acme = "https://acme.example.com"
        "#,
    )
    .expect("valid config")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn pushed(storage: &InMemoryParStorage) -> PushedAuthorizationRequest {
    let par = PushedAuthorizationRequest::new(
        "my-app",
        serde_json::json!({"response_type": "code", "state": "abc123"}),
        Duration::seconds(60),
    );
    storage.create(&par).await.expect("stored");
    par
}

#[tokio::test]
async fn query_response_gets_state_and_issuer() {
    init_tracing();
    let storage = Arc::new(InMemoryParStorage::new());
    let responder = single_tenant(storage);
    let mut events = responder.broadcaster().subscribe();
    let processor = FixedProcessor::new(ResponseParameters::new().with("code", "xyz"));

    let delivery = responder
        .respond(&context(Client::new("my-app"), "code", Some("query")), &processor)
        .await
        .expect("delivered");

    let location = Url::parse(delivery.location().expect("redirect")).unwrap();
    let pairs: Vec<(String, String)> = location.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("code".to_string(), "xyz".to_string()),
            ("state".to_string(), "abc123".to_string()),
            ("iss".to_string(), ISSUER.to_string()),
        ]
    );

    let event = events.recv().await.unwrap();
    assert_eq!(event.event_type.as_str(), "authorization.success");
    assert_eq!(event.parameters.get("iss").map(String::as_str), Some(ISSUER));
    assert_eq!(event.response_mode, "query");
}

#[tokio::test]
async fn consumed_request_uri_is_rejected_without_delivery() {
    init_tracing();
    let storage = Arc::new(InMemoryParStorage::new());
    let par = pushed(&storage).await;
    let consumed = storage.consume(&par.jti).await.unwrap();

    let responder = single_tenant(storage);
    let mut events = responder.broadcaster().subscribe();
    let processor = FixedProcessor::new(ResponseParameters::new().with("code", "xyz"));

    let err = responder
        .respond(
            &context(Client::new("my-app"), "code", None).with_par(consumed),
            &processor,
        )
        .await
        .unwrap_err();

    assert!(err.is_replay());
    assert_eq!(err.oauth_error_code(), "invalid_request_uri");
    assert_eq!(processor.calls(), 0);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn request_uri_completes_one_response_only() {
    let storage = Arc::new(InMemoryParStorage::new());
    let par = pushed(&storage).await;
    let responder = single_tenant(storage.clone());
    let processor = FixedProcessor::new(ResponseParameters::new().with("code", "xyz"));

    let interaction = Interaction::new("my-app", Duration::minutes(10)).with_par_jti(&par.jti);
    let ctx = context(Client::new("my-app"), "code", None).with_interaction(interaction);

    responder.respond(&ctx, &processor).await.expect("first response");
    let err = responder.respond(&ctx, &processor).await.unwrap_err();

    assert!(err.is_replay());
    assert_eq!(processor.calls(), 1);
}

#[tokio::test]
async fn concurrent_responses_for_one_request_uri() {
    init_tracing();
    let storage = Arc::new(InMemoryParStorage::new());
    let par = pushed(&storage).await;

    // Both requests loaded the record before either consumed it
    let first = single_tenant(storage.clone());
    let second = single_tenant(storage.clone());
    let ctx = context(Client::new("my-app"), "code", None).with_par(par);
    let processor = FixedProcessor::new(ResponseParameters::new().with("code", "xyz"));

    let (a, b) = tokio::join!(
        first.respond(&ctx, &processor),
        second.respond(&ctx, &processor)
    );

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let err = a.err().or(b.err()).unwrap();
    assert!(err.is_replay());
    assert_eq!(processor.calls(), 1);
}

#[tokio::test]
async fn jwt_mode_with_id_token_omits_issuer() {
    let storage = Arc::new(InMemoryParStorage::new());
    let config = tenancy_config();
    let responder = AuthorizationResponder::from_config(&config, storage).unwrap();
    let mut events = responder.broadcaster().subscribe();
    let processor = FixedProcessor::new(ResponseParameters::new().with("id_token", "eyJhbGciOi.x.y"));

    let client = Client::new("my-app").with_tenant("acme");
    let ctx = context(client, "id_token", Some("jwt"));
    assert_eq!(ctx.response_mode, ResponseMode::FragmentJwt);

    let delivery = responder.respond(&ctx, &processor).await.unwrap();

    let event = events.recv().await.unwrap();
    assert!(!event.parameters.contains_key("iss"));
    assert_eq!(event.parameters.get("state").map(String::as_str), Some("abc123"));

    let location = Url::parse(delivery.location().unwrap()).unwrap();
    let fragment = location.fragment().unwrap();
    let token = fragment.strip_prefix(&format!("{RESPONSE_PARAM}=")).unwrap();
    assert!(!fragment.contains("iss="));
    assert!(!token.is_empty());
}

#[tokio::test]
async fn form_post_jwt_response_is_verifiable() {
    let storage = Arc::new(InMemoryParStorage::new());
    let key = SigningKeyPair::generate(SigningAlgorithm::RS256).unwrap();
    let signer = Arc::new(ResponseSigner::new(key, StdDuration::from_secs(120)));
    let responder = AuthorizationResponder::new(
        storage,
        Arc::new(StaticIssuer::new(ISSUER)),
        ResponseModes::new().with_signer(signer.clone()),
    );
    let processor = FixedProcessor::new(ResponseParameters::new().with("code", "xyz"));

    let delivery = responder
        .respond(&context(Client::new("my-app"), "code", Some("form_post.jwt")), &processor)
        .await
        .unwrap();

    let fields = delivery.fields().expect("form post");
    let token = fields.get(RESPONSE_PARAM).unwrap();

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&["my-app"]);
    validation.set_issuer(&[ISSUER]);
    let claims = decode::<Map<String, Value>>(token, signer.key().decoding_key(), &validation)
        .unwrap()
        .claims;
    assert_eq!(claims["code"], "xyz");
    assert_eq!(claims["state"], "abc123");
}

#[tokio::test]
async fn tenants_get_their_own_issuer() {
    let storage = Arc::new(InMemoryParStorage::new());
    let responder = AuthorizationResponder::from_config(&tenancy_config(), storage).unwrap();
    let mut events = responder.broadcaster().subscribe();
    let processor = FixedProcessor::new(ResponseParameters::new().with("code", "xyz"));

    let acme = Client::new("acme-app").with_tenant("acme");
    let globex = Client::new("globex-app").with_tenant("globex");

    responder
        .respond(&context(acme, "code", None), &processor)
        .await
        .unwrap();
    responder
        .respond(&context(globex, "code", None), &processor)
        .await
        .unwrap();

    let first = events.recv().await.unwrap();
    let second = events.recv().await.unwrap();
    assert_eq!(first.issuer, "https://acme.example.com");
    assert_eq!(
        first.parameters.get("iss").map(String::as_str),
        Some("https://acme.example.com")
    );
    assert_eq!(second.issuer, "https://auth.example.com/tenants/globex");
    assert_eq!(
        second.parameters.get("iss").map(String::as_str),
        Some("https://auth.example.com/tenants/globex")
    );
}

#[tokio::test]
async fn audit_hook_observes_delivered_responses() {
    init_tracing();
    let storage = Arc::new(InMemoryParStorage::new());
    let par = pushed(&storage).await;
    let responder = single_tenant(storage);

    let mut config = AuthConfig::default();
    config.events.hook_timeout = StdDuration::from_secs(1);

    let (tx, mut rx) = tokio::sync::mpsc::channel(8);
    let registry = AuthorizationResponder::hooks(&config)
        .register(Arc::new(AuthorizationAuditHook::new().with_sink(tx)))
        .await
        .start(responder.broadcaster().subscribe());
    assert_eq!(registry.timeout(), StdDuration::from_secs(1));

    let processor = FixedProcessor::new(ResponseParameters::new().with("code", "xyz"));
    responder
        .respond(
            &context(Client::new("my-app"), "code", Some("form_post")).with_par(par.clone()),
            &processor,
        )
        .await
        .unwrap();

    let record = tokio::time::timeout(StdDuration::from_secs(1), rx.recv())
        .await
        .expect("audit record in time")
        .expect("audit record");
    assert_eq!(record.client_id, "my-app");
    assert_eq!(record.response_mode, "form_post");
    assert_eq!(record.par_jti.as_deref(), Some(par.jti.as_str()));
    assert_eq!(record.parameters, vec!["code", "state", "iss"]);
}
