use anyhow::Result;

use super::Artifact;
use super::GenerateResponse;
use super::Stability;
use crate::domain::models::ErrorKind;
use crate::domain::models::GenerationBackend;
use crate::domain::models::GenerationFailure;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationResult;

impl Stability {
    fn with_url(url: String) -> Stability {
        return Stability {
            url,
            token: "abc".to_string(),
            timeout: "500".to_string(),
        };
    }
}

fn to_failure(result: GenerationResult) -> GenerationFailure {
    match result {
        GenerationResult::Failure(failure) => return failure,
        GenerationResult::Success(_) => panic!("expected a failure"),
    }
}

#[tokio::test]
async fn it_successfully_health_checks() {
    let backend = Stability::with_url("https://api.stability.ai".to_string());

    assert!(backend.health_check().await.is_ok());
}

#[tokio::test]
async fn it_fails_health_checks_without_a_token() {
    let backend = Stability {
        url: "https://api.stability.ai".to_string(),
        token: "".to_string(),
        timeout: "500".to_string(),
    };

    assert!(backend.health_check().await.is_err());
}

#[tokio::test]
async fn it_generates_from_an_image_field() -> Result<()> {
    let body = serde_json::to_string(&GenerateResponse {
        image: Some("aGVsbG8=".to_string()),
        artifacts: None,
    })?;

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v2beta/stable-image/generate/ultra")
        .match_header("authorization", "Bearer abc")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_body(body)
        .create();

    let backend = Stability::with_url(server.url());
    let result = backend.generate(GenerationRequest::new("a cat")).await;

    mock.assert();
    match result {
        GenerationResult::Success(image) => {
            assert_eq!(image.as_data_uri(), "data:image/png;base64,aGVsbG8=");
        }
        GenerationResult::Failure(failure) => panic!("expected success, got {failure:?}"),
    }
    return Ok(());
}

#[tokio::test]
async fn it_generates_from_the_first_artifact() -> Result<()> {
    let body = serde_json::to_string(&GenerateResponse {
        image: None,
        artifacts: Some(vec![
            Artifact {
                base64: "Zmlyc3Q=".to_string(),
            },
            Artifact {
                base64: "c2Vjb25k".to_string(),
            },
        ]),
    })?;

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v2beta/stable-image/generate/ultra")
        .with_status(200)
        .with_body(body)
        .create();

    let backend = Stability::with_url(server.url());
    let result = backend.generate(GenerationRequest::new("a cat")).await;

    mock.assert();
    match result {
        GenerationResult::Success(image) => {
            assert_eq!(image.as_data_uri(), "data:image/png;base64,Zmlyc3Q=");
        }
        GenerationResult::Failure(failure) => panic!("expected success, got {failure:?}"),
    }
    return Ok(());
}

#[tokio::test]
async fn it_classifies_401_as_authentication() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v2beta/stable-image/generate/ultra")
        .with_status(401)
        .with_body("{\"errors\":[\"invalid api key\"]}")
        .create();

    let backend = Stability::with_url(server.url());
    let failure = to_failure(backend.generate(GenerationRequest::new("a cat")).await);

    mock.assert();
    assert_eq!(failure.kind, ErrorKind::Authentication);
    assert_eq!(failure.status, Some(401));
    assert!(failure.message.contains("401"));
    assert!(failure.body.unwrap().contains("invalid api key"));
}

#[tokio::test]
async fn it_classifies_403_as_permission_or_quota() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v2beta/stable-image/generate/ultra")
        .with_status(403)
        .with_body("quota exceeded")
        .create();

    let backend = Stability::with_url(server.url());
    let failure = to_failure(backend.generate(GenerationRequest::new("a cat")).await);

    mock.assert();
    assert_eq!(failure.kind, ErrorKind::PermissionOrQuota);
    assert_eq!(failure.status, Some(403));
}

#[tokio::test]
async fn it_classifies_invalid_language_bodies() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v2beta/stable-image/generate/ultra")
        .with_status(400)
        .with_body("{\"name\":\"invalid_language\"}")
        .create();

    let backend = Stability::with_url(server.url());
    let failure = to_failure(backend.generate(GenerationRequest::new("un gato")).await);

    mock.assert();
    assert_eq!(failure.kind, ErrorKind::UnsupportedLanguage);
    assert!(failure.message.contains("English"));
}

#[tokio::test]
async fn it_classifies_400_with_error_details() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v2beta/stable-image/generate/ultra")
        .with_status(400)
        .with_body("{\"errors\":[\"prompt too long\",\"bad aspect ratio\"]}")
        .create();

    let backend = Stability::with_url(server.url());
    let failure = to_failure(backend.generate(GenerationRequest::new("a cat")).await);

    mock.assert();
    assert_eq!(failure.kind, ErrorKind::InvalidRequest);
    assert!(failure.message.contains("prompt too long, bad aspect ratio"));
}

#[tokio::test]
async fn it_classifies_422_with_an_unparseable_body() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v2beta/stable-image/generate/ultra")
        .with_status(422)
        .with_body("<html>not json</html>")
        .create();

    let backend = Stability::with_url(server.url());
    let failure = to_failure(backend.generate(GenerationRequest::new("a cat")).await);

    mock.assert();
    assert_eq!(failure.kind, ErrorKind::InvalidRequest);
    assert!(failure.message.contains("No details"));
    assert_eq!(failure.body, Some("<html>not json</html>".to_string()));
}

#[tokio::test]
async fn it_classifies_unrecognized_success_bodies() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v2beta/stable-image/generate/ultra")
        .with_status(200)
        .with_body("{\"finish_reason\":\"SUCCESS\"}")
        .create();

    let backend = Stability::with_url(server.url());
    let failure = to_failure(backend.generate(GenerationRequest::new("a cat")).await);

    mock.assert();
    assert_eq!(failure.kind, ErrorKind::UnexpectedFormat);
    assert_eq!(failure.status, Some(200));
}

#[tokio::test]
async fn it_classifies_other_statuses_as_transport() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v2beta/stable-image/generate/ultra")
        .with_status(500)
        .with_body("internal error")
        .create();

    let backend = Stability::with_url(server.url());
    let failure = to_failure(backend.generate(GenerationRequest::new("a cat")).await);

    mock.assert();
    assert_eq!(failure.kind, ErrorKind::Transport);
    assert_eq!(failure.status, Some(500));
}

#[tokio::test]
async fn it_classifies_unreachable_hosts_as_transport() {
    let backend = Stability::with_url("http://127.0.0.1:1".to_string());
    let failure = to_failure(backend.generate(GenerationRequest::new("a cat")).await);

    assert_eq!(failure.kind, ErrorKind::Transport);
    assert_eq!(failure.status, None);
}
