use acp_host_mock::{permission_request, prompt, standard_options, text_block};
use acp_transcript::{
    ContentBlock, Disclosure, EventOutcome, HostEvent, PermissionOption, PermissionOptionKind,
    PermissionResponse, ResponseSink, Session, TranscriptError,
};
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

#[derive(Default)]
struct HostSpy {
    responses: Vec<PermissionResponse>,
}

impl ResponseSink for HostSpy {
    fn respond(&mut self, response: PermissionResponse) {
        self.responses.push(response);
    }
}

fn started() -> Session {
    let mut session = Session::new();
    session
        .apply(prompt(vec![text_block("edit the file")]))
        .expect("prompt starts a turn");
    session
}

fn allow_only() -> Vec<PermissionOption> {
    vec![PermissionOption::new(
        "a",
        PermissionOptionKind::AllowOnce,
        "Allow",
    )]
}

#[test]
fn resolving_clears_options_and_emits_one_response() {
    let mut session = started();
    let mut host = HostSpy::default();
    session
        .apply(permission_request("t2", "Edit file?", allow_only()))
        .unwrap();

    let response = session.resolve_permission(&mut host, "t2", "a").unwrap();

    assert_eq!(response, PermissionResponse::new("t2", "a"));
    assert_eq!(host.responses, vec![PermissionResponse::new("t2", "a")]);
    let request = session.permission_request("t2").unwrap();
    assert_eq!(request.title(), "Edit file?");
    assert!(request.prompt().options().is_empty());
    assert_eq!(request.prompt().selected(), Some("a"));
    assert!(session.pending_permissions().is_empty());
}

#[test]
fn second_resolution_is_rejected_without_emitting() {
    let mut session = started();
    let mut host = HostSpy::default();
    session
        .apply(permission_request("t2", "Edit file?", allow_only()))
        .unwrap();

    session.resolve_permission(&mut host, "t2", "a").unwrap();
    let second = session.resolve_permission(&mut host, "t2", "a");

    assert_matches!(second, Err(TranscriptError::AlreadyResolved { tool_call_id }) if tool_call_id == "t2");
    assert_eq!(host.responses.len(), 1);
}

#[test]
fn unknown_option_is_rejected_and_request_stays_live() {
    let mut session = started();
    let mut host = HostSpy::default();
    session
        .apply(permission_request("t2", "Edit file?", allow_only()))
        .unwrap();

    let err = session
        .resolve_permission(&mut host, "t2", "reject")
        .unwrap_err();

    assert_matches!(err, TranscriptError::UnknownOption { option_id, .. } if option_id == "reject");
    assert!(host.responses.is_empty());
    assert_eq!(session.pending_permissions().len(), 1);

    session.resolve_permission(&mut host, "t2", "a").unwrap();
    assert_eq!(host.responses, vec![PermissionResponse::new("t2", "a")]);
}

#[test]
fn resolving_a_request_that_never_existed_fails() {
    let mut session = started();
    let mut host = HostSpy::default();

    assert_matches!(
        session.resolve_permission(&mut host, "nobody", "a"),
        Err(TranscriptError::UnknownRequest { .. })
    );
    assert!(host.responses.is_empty());
}

#[test]
fn request_before_any_prompt_has_no_turn() {
    let mut session = Session::new();

    let err = session
        .apply(permission_request("t2", "Edit file?", allow_only()))
        .unwrap_err();

    assert_matches!(err, TranscriptError::NoActiveTurn { event: "permission_request" });
    assert!(session.pending_permissions().is_empty());
}

#[test]
fn payload_panes_show_fenced_json_and_collapse_on_resolution() {
    let mut session = started();
    let mut host = HostSpy::default();
    session
        .apply(HostEvent::PermissionRequest {
            tool_call_id: "t2".to_string(),
            options: standard_options(),
            title: Some("Write file?".to_string()),
            kind: Some("edit".to_string()),
            input: Some("{\"path\":\"a.txt\"}".to_string()),
            output: Some("{\"ok\":true}".to_string()),
        })
        .unwrap();

    let request = session.permission_request("t2").unwrap();
    let input = request.input().unwrap();
    assert_eq!(
        input.block(),
        &ContentBlock::text("```json\n{\"path\":\"a.txt\"}\n```")
    );
    assert_eq!(input.disclosure(), Disclosure::Expanded);

    assert!(session.toggle_details("t2"));
    assert!(session.toggle_details("t2"));
    session.resolve_permission(&mut host, "t2", "reject").unwrap();

    let request = session.permission_request("t2").unwrap();
    assert_eq!(request.input().map(|pane| pane.disclosure()), Some(Disclosure::Collapsed));
    assert_eq!(request.output().map(|pane| pane.disclosure()), Some(Disclosure::Collapsed));
    assert_eq!(host.responses, vec![PermissionResponse::new("t2", "reject")]);
}

#[test]
fn request_without_payloads_has_nothing_to_toggle() {
    let mut session = started();
    session
        .apply(permission_request("t2", "Edit file?", allow_only()))
        .unwrap();

    assert!(session.permission_request("t2").unwrap().input().is_none());
    assert!(!session.toggle_details("t2"));
}

#[test]
fn blank_title_falls_back_to_the_tool_call_id() {
    let mut session = started();
    session
        .apply(permission_request("edit-7", "", allow_only()))
        .unwrap();
    session
        .apply(HostEvent::ToolCall {
            tool_call_id: "exec-8".to_string(),
            title: None,
            kind: Some("execute".to_string()),
            status: Some("pending".to_string()),
            content: None,
            options: Some(allow_only()),
        })
        .unwrap();

    assert_eq!(session.permission_request("edit-7").unwrap().title(), "edit-7");
    assert_eq!(session.tool_call("exec-8").unwrap().title(), "exec-8");
}

#[test]
fn tool_call_with_options_is_resolved_like_a_request() {
    let mut session = started();
    let mut host = HostSpy::default();
    session
        .apply(HostEvent::ToolCall {
            tool_call_id: "t3".to_string(),
            title: Some("Run tests".to_string()),
            kind: Some("execute".to_string()),
            status: Some("pending".to_string()),
            content: Some("cargo test".to_string()),
            options: Some(standard_options()),
        })
        .unwrap();

    let call = session.tool_call("t3").unwrap();
    assert!(call.is_permission_request());
    assert_eq!(call.disclosure(), Disclosure::Expanded);
    let pending = session.pending_permissions();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].title, "Run tests");
    assert_eq!(pending[0].options.len(), 4);

    session
        .resolve_permission(&mut host, "t3", "allow_always")
        .unwrap();

    let call = session.tool_call("t3").unwrap();
    assert_eq!(call.permission().and_then(|prompt| prompt.selected()), Some("allow_always"));
    assert_eq!(call.disclosure(), Disclosure::Collapsed);
    assert_eq!(host.responses, vec![PermissionResponse::new("t3", "allow_always")]);
}

#[test]
fn repeated_request_supersedes_the_unresolved_one() {
    let mut session = started();
    let mut host = HostSpy::default();
    let first = session
        .apply(permission_request("t2", "Edit file?", allow_only()))
        .unwrap();
    let EventOutcome::PermissionRequested { at: first_at, .. } = first else {
        panic!("expected permission outcome");
    };

    let second = session
        .apply(permission_request("t2", "Edit file again?", allow_only()))
        .unwrap();

    assert_matches!(
        second,
        EventOutcome::PermissionRequested { superseded: Some(at), .. } if at == first_at
    );
    let old = session
        .transcript()
        .segment(first_at)
        .and_then(|segment| segment.permission_request())
        .unwrap();
    assert!(old.prompt().options().is_empty());

    session.resolve_permission(&mut host, "t2", "a").unwrap();
    assert_eq!(host.responses.len(), 1);
    assert_eq!(
        session.permission_request("t2").unwrap().title(),
        "Edit file again?"
    );
}

#[test]
fn new_request_after_resolution_can_be_resolved_again() {
    let mut session = started();
    let mut host = HostSpy::default();
    session
        .apply(permission_request("t2", "Edit file?", allow_only()))
        .unwrap();
    session.resolve_permission(&mut host, "t2", "a").unwrap();

    session
        .apply(permission_request("t2", "Edit another file?", allow_only()))
        .unwrap();
    session.resolve_permission(&mut host, "t2", "a").unwrap();

    assert_eq!(
        host.responses,
        vec![
            PermissionResponse::new("t2", "a"),
            PermissionResponse::new("t2", "a")
        ]
    );
}

#[test]
fn placeholder_braces_title_falls_back_to_the_tool_call_id() {
    let mut session = started();
    session
        .apply(HostEvent::ToolCall {
            tool_call_id: "t9".to_string(),
            title: Some("{}".to_string()),
            kind: Some("edit".to_string()),
            status: Some("pending".to_string()),
            content: None,
            options: Some(allow_only()),
        })
        .unwrap();

    assert_eq!(session.tool_call("t9").map(|call| call.title()), Some("t9"));
}

#[test]
fn option_with_unrecognized_kind_can_still_be_chosen() {
    let mut session = started();
    let mut host = HostSpy::default();
    let event = HostEvent::from_json_line(
        r#"{"event":"permission_request","toolCallId":"t2","title":"Edit file?","options":[{"optionId":"a","kind":"allow_once","name":"Allow"},{"optionId":"s","kind":"allow_session","name":"Allow for session"}]}"#,
    )
    .expect("request with an unknown option kind parses");

    session.apply(event).unwrap();
    let pending = session.pending_permissions();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].options[1].kind, None);

    session.resolve_permission(&mut host, "t2", "s").unwrap();
    assert_eq!(host.responses, vec![PermissionResponse::new("t2", "s")]);
}
