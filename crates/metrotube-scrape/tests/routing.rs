//! Routing and end-to-end extraction through a recording transport.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use metrotube::config::Settings;
use metrotube::models::Operation;
use metrotube::session::{Channel, SessionState};
use metrotube_scrape::{
    ContentService, Dispatcher, ExtractionStatus, FeedError, FetchError, PlaceholderReason,
    PlaceholderSource, PreparedRequest, RequestMethod, Transport, TransportFailure,
    TransportResponse,
};
use serde_json::json;

/// Records every request and answers with a fixed body.
struct RecordingTransport {
    body: String,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl RecordingTransport {
    fn new(body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            body: body.into(),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(
        &self,
        request: &PreparedRequest,
    ) -> Result<TransportResponse, TransportFailure> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(TransportResponse {
            status: 200,
            body: self.body.clone(),
        })
    }
}

fn cookie_session() -> SessionState {
    let mut session = SessionState::new();
    session.set_cookies("SID=secret");
    session.set_visitor_data("CgtWaXNpdG9y");
    session
}

fn all_operations() -> Vec<Operation> {
    vec![
        Operation::Home,
        Operation::search("rust"),
        Operation::Recommendations,
        Operation::Library,
        Operation::playlist("PL1"),
        Operation::video_detail("dQw4w9WgXcQ"),
        Operation::related("dQw4w9WgXcQ"),
        Operation::channel("UCabc"),
    ]
}

#[tokio::test]
async fn test_library_without_session_fails_without_request() {
    let transport = RecordingTransport::new("{}");
    let service = ContentService::new(&Settings::default(), transport.clone());

    let err = service
        .load(&Operation::Library, &SessionState::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FeedError::AuthenticationRequired {
            operation: "library"
        }
    ));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_search_with_valid_session_posts_to_internal_api() {
    let transport = RecordingTransport::new("{}");
    let dispatcher = Dispatcher::new(&Settings::default(), transport.clone());

    let payload = dispatcher
        .fetch(&Operation::search("x"), &cookie_session())
        .await
        .unwrap();
    assert_eq!(payload.channel, Channel::Internal);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, RequestMethod::Post);
    assert!(request
        .url
        .starts_with("https://music.youtube.com/youtubei/v1/search?key="));
    assert_eq!(request.headers()["Cookie"], "SID=secret");
    assert_eq!(request.headers()["X-Goog-Visitor-Id"], "CgtWaXNpdG9y");

    let body = serde_json::to_value(request.body.as_ref().unwrap()).unwrap();
    assert_eq!(body["query"], "x");
    assert_eq!(body["context"]["client"]["clientVersion"], "1.20250310.01.00");
}

#[tokio::test]
async fn test_search_without_session_gets_public_page() {
    let transport = RecordingTransport::new("<html></html>");
    let dispatcher = Dispatcher::new(&Settings::default(), transport.clone());

    let payload = dispatcher
        .fetch(&Operation::search("x"), &SessionState::new())
        .await
        .unwrap();
    assert_eq!(payload.channel, Channel::Public);

    let request = &transport.requests()[0];
    assert_eq!(request.method, RequestMethod::Get);
    assert_eq!(request.url, "https://www.youtube.com/results?search_query=x");
    assert!(request.body.is_none());
}

#[tokio::test]
async fn test_public_requests_never_carry_credentials() {
    // Cookies without visitor data do not make a valid session.
    let mut session = SessionState::new();
    session.set_cookies("SID=secret");
    let dispatcher = Dispatcher::new(&Settings::default(), RecordingTransport::new(""));

    for operation in all_operations() {
        let Ok(request) = dispatcher.plan(&operation, &session) else {
            assert_eq!(operation, Operation::Library);
            continue;
        };
        assert_eq!(request.channel(), Channel::Public);
        assert!(!request.headers().contains_key("Cookie"));
        assert!(request.headers().contains_key("User-Agent"));
        assert!(request.headers().contains_key("Accept-Language"));
    }
}

#[test]
fn test_every_operation_routes_internally_for_valid_session() {
    let dispatcher = Dispatcher::new(&Settings::default(), RecordingTransport::new(""));
    let session = cookie_session();

    let endpoints: Vec<String> = all_operations()
        .iter()
        .map(|op| {
            let request = dispatcher.plan(op, &session).unwrap();
            assert_eq!(request.channel(), Channel::Internal);
            assert_eq!(request.context.operation, op.name());
            let path = request.url.split('?').next().unwrap();
            path.rsplit('/').next().unwrap().to_string()
        })
        .collect();

    assert_eq!(
        endpoints,
        ["browse", "search", "browse", "browse", "browse", "player", "next", "browse"]
    );
}

#[test]
fn test_public_paths_for_anonymous_session() {
    let dispatcher = Dispatcher::new(&Settings::default(), RecordingTransport::new(""));
    let session = SessionState::new();
    let url = |op: Operation| dispatcher.plan(&op, &session).unwrap().url;

    assert_eq!(url(Operation::Home), "https://www.youtube.com/");
    assert_eq!(
        url(Operation::Recommendations),
        "https://www.youtube.com/feed/trending"
    );
    assert_eq!(
        url(Operation::playlist("PL1")),
        "https://www.youtube.com/playlist?list=PL1"
    );
    assert_eq!(
        url(Operation::video_detail("dQw4w9WgXcQ")),
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
    );
    assert_eq!(
        url(Operation::channel("UCabc")),
        "https://www.youtube.com/channel/UCabc"
    );
    assert!(matches!(
        dispatcher.plan(&Operation::Library, &session),
        Err(FetchError::AuthenticationRequired { .. })
    ));
}

#[tokio::test]
async fn test_internal_listing_is_walked_and_deduplicated() {
    let body = json!({
        "contents": {
            "a": { "videoRenderer": { "videoId": "X", "title": { "runs": [{ "text": "t" }] } } },
            "b": [{ "videoRenderer": { "videoId": "Y" } }]
        },
        "continuationContents": {
            "more": [
                { "compactVideoRenderer": { "videoId": "Z" } },
                { "videoRenderer": { "videoId": "X", "title": { "runs": [{ "text": "later" }] } } }
            ]
        }
    });
    let service = ContentService::new(
        &Settings::default(),
        RecordingTransport::new(body.to_string()),
    );

    let page = service
        .load(&Operation::Home, &cookie_session())
        .await
        .unwrap();

    let ids: Vec<_> = page.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["X", "Y", "Z"]);
    assert_eq!(page.records[0].title, "t");
    assert_eq!(page.status, ExtractionStatus::Complete);
}

#[tokio::test]
async fn test_unparseable_internal_payload_is_an_extraction_failure() {
    let service = ContentService::new(&Settings::default(), RecordingTransport::new("garbage"));

    let err = service
        .load(&Operation::Recommendations, &cookie_session())
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::ExtractionFailed { .. }));
}

#[tokio::test]
async fn test_public_search_empty_is_distinguishable_from_failure() {
    let session = SessionState::new();

    let empty = ContentService::new(
        &Settings::default(),
        RecordingTransport::new("<html><body><div id='contents'></div></body></html>"),
    )
    .load(&Operation::search("nothing"), &session)
    .await
    .unwrap();

    let broken = ContentService::new(&Settings::default(), RecordingTransport::new(""))
        .load(&Operation::search("nothing"), &session)
        .await
        .unwrap();

    assert_eq!(empty.records.len(), 1);
    assert_eq!(broken.records.len(), 1);
    assert_eq!(
        empty.status,
        ExtractionStatus::Placeholder(PlaceholderReason::NoResults)
    );
    assert_eq!(
        broken.status,
        ExtractionStatus::Placeholder(PlaceholderReason::ParseFailure)
    );
}

#[tokio::test]
async fn test_public_page_identity_and_thumbnail() {
    let html = r#"<html><body>
        <div class="ytd-rich-item-renderer">
          <a href="/watch?v=dQw4w9WgXcQ" title="Song">Song</a>
          <img src="//i.ytimg.com/vi/dQw4w9WgXcQ/hq.jpg">
        </div>
    </body></html>"#;
    let service = ContentService::new(&Settings::default(), RecordingTransport::new(html));

    let page = service
        .load(&Operation::Home, &SessionState::new())
        .await
        .unwrap();

    assert_eq!(page.records.len(), 1);
    let record = &page.records[0];
    assert_eq!(record.id, "dQw4w9WgXcQ");
    assert_eq!(record.thumbnail_url, "https://i.ytimg.com/vi/dQw4w9WgXcQ/hq.jpg");
    assert_eq!(
        record.canonical_url,
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
    );
}

struct EmptyPlaceholders;

impl PlaceholderSource for EmptyPlaceholders {
    fn listing(&self) -> Vec<metrotube::models::ContentRecord> {
        Vec::new()
    }

    fn search(&self) -> Vec<metrotube::models::ContentRecord> {
        Vec::new()
    }
}

#[tokio::test]
async fn test_placeholders_are_injectable() {
    let service = ContentService::new(&Settings::default(), RecordingTransport::new(""))
        .with_placeholders(Arc::new(EmptyPlaceholders));

    let page = service
        .load(&Operation::Home, &SessionState::new())
        .await
        .unwrap();
    assert!(page.records.is_empty());
    assert!(page.is_placeholder());
}
