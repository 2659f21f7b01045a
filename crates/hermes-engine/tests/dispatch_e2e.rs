//! End-to-end dispatch: resolution outcomes, policies and explanations.

use std::sync::Arc;

use bytes::Bytes;
use hermes_core::{Condition, ConditionKind, ErrorPolicy, Invocation, MediaType, Reply, TypeSpec, Value};
use hermes_engine::{Engine, EngineBuilder, ExplainKey, Explanation, InboundRequest};
use hermes_router::Registration;
use http::header::ALLOW;
use http::{Method, StatusCode};
use serde::Deserialize;

fn get(target: &str) -> InboundRequest {
    InboundRequest::new(Method::GET, target)
}

fn widget_engine(builder: EngineBuilder) -> Engine {
    let mut builder = builder;
    for (media, template) in [("text/plain", "widget {}"), ("text/html", "<h1>widget {}</h1>")] {
        builder = builder.register(
            "widget",
            Registration::builder()
                .verb(Method::GET)
                .media(media)
                .positional(TypeSpec::Integer)
                .handler(move |inv: Invocation| async move {
                    let id = inv.arguments().positional(0).and_then(Value::as_i64).unwrap_or(-1);
                    Ok::<_, anyhow::Error>(Reply::ok(template.replace("{}", &id.to_string())))
                })
                .build()
                .unwrap(),
        );
    }
    builder.build()
}

#[tokio::test]
async fn widget_scenario() {
    let engine = widget_engine(Engine::builder());

    let html = engine
        .dispatch(get("/widget/42").with_accept("text/html"))
        .await
        .unwrap();
    assert_eq!(html.status, StatusCode::OK);
    assert_eq!(html.content_type.as_deref(), Some("text/html"));
    assert_eq!(html.text().as_deref(), Some("<h1>widget 42</h1>"));

    let trailing = engine
        .dispatch(get("/widget/42/").with_accept("text/html"))
        .await
        .unwrap();
    assert_eq!(trailing, html);

    let plain = engine
        .dispatch(get("/widget/42").with_accept("text/plain"))
        .await
        .unwrap();
    assert_eq!(plain.content_type.as_deref(), Some("text/plain"));
    assert_eq!(plain.text().as_deref(), Some("widget 42"));

    // without a preference the earlier registration wins
    let default = engine.dispatch(get("/widget/42")).await.unwrap();
    assert_eq!(default.text().as_deref(), Some("widget 42"));

    for accept in [None, Some("text/html"), Some("text/plain"), Some("application/json")] {
        let mut request = get("/widget/abc");
        if let Some(accept) = accept {
            request = request.with_accept(accept);
        }
        let bad = engine.dispatch(request).await.unwrap();
        assert_eq!(bad.status, StatusCode::BAD_REQUEST, "accept {accept:?}");
        assert!(bad.body.is_none());
    }

    let shape = engine
        .dispatch(get("/widget/42/99").with_accept("text/html"))
        .await
        .unwrap();
    assert_eq!(shape.status, StatusCode::NOT_FOUND);

    let unknown = engine.dispatch(get("/gadget/1")).await.unwrap();
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn method_not_allowed_lists_verbs() {
    let mut builder = Engine::builder();
    for verb in [Method::PUT, Method::GET] {
        builder = builder.register(
            "doc",
            Registration::builder()
                .verb(verb)
                .positional(TypeSpec::Any)
                .handler(|_inv: Invocation| async { Ok::<_, anyhow::Error>(Reply::empty()) })
                .build()
                .unwrap(),
        );
    }
    let engine = builder.build();

    let response = engine
        .dispatch(InboundRequest::new(Method::DELETE, "/doc/7"))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers[ALLOW], "GET, PUT");
}

fn report_engine(builder: EngineBuilder) -> Engine {
    let mut builder = builder;
    for (media, body) in [("text/plain", "plain report"), ("application/json", "{\"report\":true}")] {
        builder = builder.register(
            "report",
            Registration::builder()
                .verb(Method::GET)
                .media(media)
                .handler(move |_inv: Invocation| async move { Ok::<_, anyhow::Error>(Reply::ok(body)) })
                .build()
                .unwrap(),
        );
    }
    builder.build()
}

#[tokio::test]
async fn accept_negotiation() {
    let engine = report_engine(Engine::builder());

    let json = engine
        .dispatch(get("/report").with_accept("application/json"))
        .await
        .unwrap();
    assert_eq!(json.content_type.as_deref(), Some("application/json"));
    assert_eq!(json.text().as_deref(), Some("{\"report\":true}"));

    let text = engine.dispatch(get("/report").with_accept("text/*")).await.unwrap();
    assert_eq!(text.content_type.as_deref(), Some("text/plain"));

    let none = engine
        .dispatch(get("/report").with_accept("application/xml"))
        .await
        .unwrap();
    assert_eq!(none.status, StatusCode::NOT_ACCEPTABLE);
}

#[derive(Debug, Deserialize)]
struct Note {
    text: String,
}

#[tokio::test]
async fn payload_reaches_handler_and_bad_type_is_415() {
    let engine = Engine::builder()
        .register(
            "note",
            Registration::builder()
                .verb(Method::POST)
                .media("application/json")
                .handler(|inv: Invocation| async move {
                    let note: Note = inv.json()?;
                    Ok::<_, anyhow::Error>(Reply::text(note.text).with_status(StatusCode::CREATED))
                })
                .build()
                .unwrap(),
        )
        .build();

    let created = engine
        .dispatch(
            InboundRequest::new(Method::POST, "/note")
                .with_content_type("application/json")
                .with_payload(Bytes::from_static(b"{\"text\":\"hello\"}")),
        )
        .await
        .unwrap();
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.text().as_deref(), Some("hello"));

    let unsupported = engine
        .dispatch(
            InboundRequest::new(Method::POST, "/note")
                .with_content_type("text/csv")
                .with_payload("a,b"),
        )
        .await
        .unwrap();
    assert_eq!(unsupported.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

fn failing_engine(builder: EngineBuilder) -> Engine {
    builder
        .register(
            "fail",
            Registration::builder()
                .verb(Method::GET)
                .media("application/json")
                .positional(TypeSpec::Symbol)
                .handler(|inv: Invocation| async move {
                    match inv.arguments().positional(0).and_then(Value::as_str) {
                        Some("conflict") => Err(Condition::status(StatusCode::CONFLICT)
                            .with_detail("already exists")
                            .into()),
                        Some("payment") => Err(Condition::from_code(402)?
                            .with_payload(serde_json::json!({"balance": 0}))
                            .into()),
                        Some("panic") => panic!("handler exploded"),
                        _ => Err(anyhow::anyhow!("database unavailable")),
                    }
                    .map(|()| Reply::empty())
                })
                .build()
                .unwrap(),
        )
        .build()
}

#[tokio::test]
async fn catch_policy_is_terse() {
    let engine = failing_engine(Engine::builder());

    let conflict = engine.dispatch(get("/fail/conflict")).await.unwrap();
    assert_eq!(conflict.status, StatusCode::CONFLICT);
    assert!(conflict.body.is_none());

    let internal = engine.dispatch(get("/fail/db")).await.unwrap();
    assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(internal.body.is_none());

    let panicked = engine.dispatch(get("/fail/panic")).await.unwrap();
    assert_eq!(panicked.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(panicked.body.is_none());
}

#[tokio::test]
async fn explicit_status_payload_is_rendered() {
    let engine = failing_engine(Engine::builder());

    let response = engine.dispatch(get("/fail/payment")).await.unwrap();
    assert_eq!(response.status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&response.body.unwrap()).unwrap();
    assert_eq!(body["balance"], 0);
}

#[tokio::test]
async fn verbose_policy_renders_envelope_for_json() {
    let engine = failing_engine(
        Engine::builder()
            .conditions(ErrorPolicy::Verbose)
            .internal_errors(ErrorPolicy::Verbose),
    );

    let conflict = engine.dispatch(get("/fail/conflict")).await.unwrap();
    let envelope: serde_json::Value = serde_json::from_slice(&conflict.body.unwrap()).unwrap();
    assert_eq!(envelope["error"]["status"], 409);
    assert_eq!(envelope["error"]["message"], "already exists");

    let internal = engine.dispatch(get("/fail/db")).await.unwrap();
    let envelope: serde_json::Value = serde_json::from_slice(&internal.body.unwrap()).unwrap();
    assert_eq!(envelope["error"]["code"], ConditionKind::InternalHandlerError.code());
    assert!(envelope["error"]["message"]
        .as_str()
        .unwrap()
        .contains("database unavailable"));
}

#[tokio::test]
async fn verbose_policy_renders_text_otherwise() {
    let engine = widget_engine(Engine::builder().conditions(ErrorPolicy::Verbose));

    let response = engine.dispatch(get("/widget/abc")).await.unwrap();
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.content_type.as_ref().unwrap().starts_with("text/plain"));
    assert!(response.text().unwrap().contains("positional argument 0"));
}

#[tokio::test]
async fn propagate_policies_are_independent() {
    let engine = failing_engine(Engine::builder().conditions(ErrorPolicy::Propagate));

    let escalation = engine.dispatch(get("/fail/conflict")).await.unwrap_err();
    assert_eq!(escalation.resource, "fail");
    assert_eq!(escalation.condition.status_code(), StatusCode::CONFLICT);

    let shape = engine.dispatch(get("/fail")).await.unwrap_err();
    assert_eq!(shape.into_condition().kind(), ConditionKind::PathShapeMismatch);

    let internal = engine.dispatch(get("/fail/db")).await.unwrap();
    assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn propagated_internal_error_keeps_source() {
    let engine = failing_engine(Engine::builder().internal_errors(ErrorPolicy::Propagate));

    let escalation = engine.dispatch(get("/fail/db")).await.unwrap_err();
    assert!(escalation.condition.is_internal());
    let source = std::error::Error::source(&escalation.condition).unwrap();
    assert_eq!(source.to_string(), "database unavailable");

    let conflict = engine.dispatch(get("/fail/conflict")).await.unwrap();
    assert_eq!(conflict.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn propagated_panic_is_resumed() {
    let engine = Arc::new(failing_engine(
        Engine::builder().internal_errors(ErrorPolicy::Propagate),
    ));

    let task = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.dispatch(get("/fail/panic")).await }
    });

    let err = task.await.unwrap_err();
    assert!(err.is_panic());
}

#[tokio::test]
async fn explanation_hooks_pick_most_specific() {
    let html: MediaType = "text/html".parse().unwrap();
    let engine = widget_engine(
        Engine::builder()
            .explain(ExplainKey::any(), |ctx: &hermes_engine::ExplainContext<'_>| {
                Explanation::text(format!("{} error", ctx.condition.status_code().as_u16()))
            })
            .explain(
                ExplainKey::any()
                    .kind(ConditionKind::ArgumentDecode)
                    .resource("widget")
                    .media(html),
                |_: &hermes_engine::ExplainContext<'_>| {
                    Explanation::with_type("<p>bad widget id</p>", "text/html")
                },
            ),
    );

    let decode = engine
        .dispatch(get("/widget/abc").with_accept("text/html"))
        .await
        .unwrap();
    assert_eq!(decode.text().as_deref(), Some("<p>bad widget id</p>"));

    // Without an accept header there is no response type to match the html hook.
    let untyped = engine.dispatch(get("/widget/abc")).await.unwrap();
    assert_eq!(untyped.text().as_deref(), Some("400 error"));
    assert_eq!(decode.content_type.as_deref(), Some("text/html"));

    let shape = engine.dispatch(get("/widget/1/2")).await.unwrap();
    assert_eq!(shape.text().as_deref(), Some("404 error"));
}

#[tokio::test]
async fn keyword_arguments_round_trip() {
    let engine = Engine::builder()
        .register(
            "list",
            Registration::builder()
                .verb(Method::GET)
                .keyword_default("limit", TypeSpec::Integer, 10)
                .keyword("sort", TypeSpec::Symbol)
                .handler(|inv: Invocation| async move {
                    let limit = inv.arguments().keyword("limit").and_then(Value::as_i64);
                    Ok::<_, anyhow::Error>(Reply::text(format!("{limit:?}")))
                })
                .build()
                .unwrap(),
        )
        .build();

    let path = engine
        .generate("list", &[], &[("limit", Value::Integer(25)), ("sort", Value::symbol("name"))])
        .unwrap();
    let response = engine.dispatch(get(&path)).await.unwrap();
    assert_eq!(response.text().as_deref(), Some("Some(25)"));

    let unknown = engine.dispatch(get("/list?sort=name&colour=red")).await.unwrap();
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

    let malformed = engine.dispatch(get("/list?sort=name&limit=ten")).await.unwrap();
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn from_http_request() {
    let engine = report_engine(Engine::builder());

    let request = http::Request::builder()
        .uri("/report")
        .header(http::header::ACCEPT, "application/json")
        .body(Bytes::new())
        .unwrap();

    let response = engine
        .dispatch(InboundRequest::from_http(&request))
        .await
        .unwrap()
        .into_http()
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[http::header::CONTENT_TYPE], "application/json");
}
