use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Notify;
use txpanel_engine::{BuildError, EchoBuilder, Services, SubmitError, TransactionBuilder, TransactionSubmitter};
use txpanel_types::{ArgType, ArgValues, FunctionSpec, InputSpec, NodeId, Transaction};
use txpanel_ui::{MemorySurface, Tree, UiEvent, WorkflowError, WorkflowPhase};
use txpanel_util::UiConfig;

/// Builder that echoes its arguments unless told to reject them.
#[derive(Default)]
struct ScriptedBuilder {
    rejection: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl ScriptedBuilder {
    fn reject_with(&self, message: &str) {
        *self.rejection.lock().unwrap() = Some(message.to_string());
    }

    fn accept(&self) {
        *self.rejection.lock().unwrap() = None;
    }
}

#[async_trait]
impl TransactionBuilder for ScriptedBuilder {
    async fn build_transaction(&self, args: &ArgValues) -> Result<Transaction, BuildError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.rejection.lock().unwrap().clone() {
            return Err(BuildError::new(message));
        }
        EchoBuilder.build_transaction(args).await
    }
}

/// Submitter recording what it was asked to send.
#[derive(Default)]
struct RecordingSubmitter {
    sent: Mutex<Vec<(Value, String)>>,
    rejection: Mutex<Option<String>>,
}

#[async_trait]
impl TransactionSubmitter for RecordingSubmitter {
    async fn submit(&self, transaction: &Transaction, kind: &str) -> Result<Value, SubmitError> {
        if let Some(message) = self.rejection.lock().unwrap().clone() {
            return Err(SubmitError::new(message));
        }
        self.sent
            .lock()
            .unwrap()
            .push((transaction.payload.clone(), kind.to_string()));
        Ok(json!({"status": "ok"}))
    }
}

/// Submitter that parks every call until released.
#[derive(Default)]
struct GatedSubmitter {
    entered: Notify,
    release: Notify,
    calls: AtomicUsize,
}

#[async_trait]
impl TransactionSubmitter for GatedSubmitter {
    async fn submit(&self, _transaction: &Transaction, _kind: &str) -> Result<Value, SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(Value::Null)
    }
}

/// Builder whose first call parks until released. Any call asked to move an
/// amount of 999 fails; everything else is echoed.
#[derive(Default)]
struct SlowFirstBuilder {
    entered: Notify,
    release: Notify,
    calls: AtomicUsize,
}

#[async_trait]
impl TransactionBuilder for SlowFirstBuilder {
    async fn build_transaction(&self, args: &ArgValues) -> Result<Transaction, BuildError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.entered.notify_one();
            self.release.notified().await;
        }
        if args.get("amount").map(String::as_str) == Some("999") {
            return Err(BuildError::new("insufficient funds"));
        }
        EchoBuilder.build_transaction(args).await
    }
}

struct Fixture {
    tree: Tree,
    surface: MemorySurface,
    root: NodeId,
    function: NodeId,
    button: NodeId,
    to: NodeId,
    amount: NodeId,
}

fn transfer_spec() -> FunctionSpec {
    FunctionSpec {
        method_name: "transfer".into(),
        kind: "send".into(),
        enabled: false,
        args: vec![InputSpec::new("to", ArgType::Address), InputSpec::new("amount", ArgType::Ether)],
    }
}

fn fixture(services: Services, builder: Arc<dyn TransactionBuilder>) -> Fixture {
    let tree = Tree::new(services);
    let function = tree.function(&transfer_spec(), builder).unwrap();
    let banner = tree.banner();
    let root = tree.panel("Wallet", true, vec![banner, function]).unwrap();
    let presentation = tree.render(root).unwrap();
    let surface = MemorySurface::from_presentation(&presentation);
    tree.attach_all(&surface).unwrap();

    let button = tree.function_button(function).unwrap();
    let to = tree.function_arg(function, "to").unwrap();
    let amount = tree.function_arg(function, "amount").unwrap();
    surface.set_value(to, "0xABC");
    surface.set_value(amount, "1");
    Fixture {
        tree,
        surface,
        root,
        function,
        button,
        to,
        amount,
    }
}

#[tokio::test]
async fn successful_build_clears_message_and_enables_trigger() {
    let f = fixture(Services::default(), Arc::new(ScriptedBuilder::default()));
    assert!(f.surface.is_disabled(f.button));

    let transaction = f.tree.build_transaction(f.function).await.unwrap();
    assert_eq!(transaction.payload, json!({"to": "0xABC", "amount": "1"}));

    let state = f.tree.workflow_state(f.function).unwrap();
    assert_eq!(state.phase, WorkflowPhase::Ready);
    assert_eq!(state.last_message, "");
    assert!(state.submit_enabled);
    assert!(!f.surface.is_disabled(f.button));
    assert_eq!(f.tree.info_text(f.function).unwrap(), "");
}

#[tokio::test]
async fn arguments_are_collected_in_declaration_order() {
    let f = fixture(Services::default(), Arc::new(EchoBuilder));
    f.surface.set_value(f.amount, "3");
    f.surface.set_value(f.to, "0xDEF");

    let values = f.tree.function_arg_values(f.function).unwrap();
    assert_eq!(values.keys().collect::<Vec<_>>(), vec!["to", "amount"]);
    assert_eq!(values["to"], "0xDEF");
}

#[tokio::test]
async fn failed_build_disables_trigger_and_is_returned_to_direct_callers() {
    let builder = Arc::new(ScriptedBuilder::default());
    builder.reject_with("insufficient funds");
    let f = fixture(Services::default(), builder.clone());

    for _ in 0..2 {
        let error = f.tree.build_transaction(f.function).await.unwrap_err();
        assert_eq!(error, WorkflowError::Build(BuildError::new("insufficient funds")));
        assert_eq!(error.to_string(), "insufficient funds");

        let state = f.tree.workflow_state(f.function).unwrap();
        assert_eq!(state.phase, WorkflowPhase::BuildFailed);
        assert_eq!(state.last_message, "insufficient funds");
        assert!(!state.submit_enabled);
        assert!(f.surface.is_disabled(f.button));
        assert_eq!(f.tree.info_text(f.function).unwrap(), "insufficient funds");
    }
    assert_eq!(builder.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn input_changes_rebuild_without_surfacing_failures() {
    let builder = Arc::new(ScriptedBuilder::default());
    builder.reject_with("insufficient funds");
    let f = fixture(Services::default(), builder.clone());

    let reached = f.tree.dispatch(f.amount, UiEvent::Mutate).await.unwrap();
    assert_eq!(reached, vec![f.amount, f.function, f.root]);
    assert_eq!(f.tree.info_text(f.function).unwrap(), "insufficient funds");
    assert!(f.surface.is_disabled(f.button));

    builder.accept();
    f.tree.dispatch(f.to, UiEvent::Mutate).await.unwrap();
    assert_eq!(f.tree.info_text(f.function).unwrap(), "");
    assert!(!f.surface.is_disabled(f.button));
    assert_eq!(builder.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn submit_wrapper_reports_build_failure_without_submitting() {
    let builder = Arc::new(ScriptedBuilder::default());
    builder.reject_with("insufficient funds");
    let submitter = Arc::new(RecordingSubmitter::default());
    let f = fixture(Services::default().with_submitter(submitter.clone()), builder);

    assert_eq!(f.tree.send_transaction(f.function).await, "insufficient funds");
    assert!(submitter.sent.lock().unwrap().is_empty());

    let state = f.tree.workflow_state(f.function).unwrap();
    assert_eq!(state.phase, WorkflowPhase::BuildFailed);
    assert!(!state.submit_in_flight);
    assert!(f.surface.is_disabled(f.button));
}

#[tokio::test]
async fn submit_wrapper_reports_submission_failure() {
    let submitter = Arc::new(RecordingSubmitter::default());
    *submitter.rejection.lock().unwrap() = Some("execution reverted".into());
    let f = fixture(
        Services::default().with_submitter(submitter.clone()),
        Arc::new(ScriptedBuilder::default()),
    );

    assert_eq!(f.tree.send_transaction(f.function).await, "execution reverted");

    let state = f.tree.workflow_state(f.function).unwrap();
    assert_eq!(state.phase, WorkflowPhase::SubmitFailed);
    assert_eq!(state.last_message, "execution reverted");
    assert!(state.submit_enabled);
    assert_eq!(f.tree.info_text(f.function).unwrap(), "execution reverted");
}

#[tokio::test]
async fn activating_after_a_failure_rebuilds_then_submits() {
    let builder = Arc::new(ScriptedBuilder::default());
    builder.reject_with("insufficient funds");
    let submitter = Arc::new(RecordingSubmitter::default());
    let f = fixture(Services::default().with_submitter(submitter.clone()), builder.clone());
    f.tree.build_transaction(f.function).await.unwrap_err();

    builder.accept();
    let reached = f.tree.dispatch(f.button, UiEvent::Activate).await.unwrap();

    assert_eq!(reached, vec![f.button, f.function, f.root]);
    assert_eq!(
        *submitter.sent.lock().unwrap(),
        vec![(json!({"to": "0xABC", "amount": "1"}), "send".to_string())]
    );
    let state = f.tree.workflow_state(f.function).unwrap();
    assert_eq!(state.phase, WorkflowPhase::Idle);
    assert_eq!(state.last_message, "");
    assert!(state.submit_enabled);
    assert_eq!(f.tree.info_text(f.function).unwrap(), "");
}

#[tokio::test]
async fn empty_sender_is_filled_before_building() {
    let config = UiConfig {
        default_account: Some("0xDEFAULT".into()),
        ..UiConfig::default()
    };
    let tree = Tree::with_config(Services::default(), config);
    let spec = FunctionSpec {
        method_name: "send".into(),
        kind: "send".into(),
        enabled: true,
        args: vec![InputSpec::new("from", ArgType::AddressFrom)],
    };
    let function = tree.function(&spec, Arc::new(EchoBuilder)).unwrap();
    let surface = MemorySurface::from_presentation(&tree.render(function).unwrap());
    tree.attach_all(&surface).unwrap();
    assert!(!surface.is_disabled(tree.function_button(function).unwrap()));

    let transaction = tree.build_transaction(function).await.unwrap();
    assert_eq!(transaction.payload, json!({"from": "0xDEFAULT"}));
}

#[tokio::test]
async fn only_one_submission_runs_at_a_time() {
    let submitter = Arc::new(GatedSubmitter::default());
    let f = fixture(
        Services::default().with_submitter(submitter.clone()),
        Arc::new(ScriptedBuilder::default()),
    );

    let tree = f.tree.clone();
    let function = f.function;
    let first = tokio::spawn(async move { tree.submit_transaction(function).await });
    submitter.entered.notified().await;

    let state = f.tree.workflow_state(f.function).unwrap();
    assert!(state.submit_in_flight);
    assert_eq!(state.phase, WorkflowPhase::Submitting);
    assert_eq!(f.tree.submit_transaction(f.function).await, Err(WorkflowError::Busy));
    assert_eq!(f.tree.send_transaction(f.function).await, "");

    submitter.release.notify_one();
    assert_eq!(first.await.unwrap(), Ok(Value::Null));
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);

    let state = f.tree.workflow_state(f.function).unwrap();
    assert!(!state.submit_in_flight);
    assert_eq!(state.phase, WorkflowPhase::Idle);
}

#[tokio::test]
async fn builds_overtaken_by_newer_builds_leave_state_alone() {
    let builder = Arc::new(SlowFirstBuilder::default());
    let f = fixture(Services::default(), builder.clone());
    f.surface.set_value(f.amount, "999");

    let tree = f.tree.clone();
    let function = f.function;
    let slow = tokio::spawn(async move { tree.build_transaction(function).await });
    builder.entered.notified().await;
    assert_eq!(f.tree.workflow_state(f.function).unwrap().phase, WorkflowPhase::Building);

    f.surface.set_value(f.amount, "1");
    f.tree.build_transaction(f.function).await.unwrap();
    builder.release.notify_one();
    let stale = slow.await.unwrap();
    assert_eq!(stale, Err(WorkflowError::Build(BuildError::new("insufficient funds"))));

    let state = f.tree.workflow_state(f.function).unwrap();
    assert_eq!(state.phase, WorkflowPhase::Ready);
    assert_eq!(state.last_message, "");
    assert!(state.submit_enabled);
    assert!(!f.surface.is_disabled(f.button));
}

#[tokio::test]
async fn submit_overtaken_by_failing_build_sends_nothing() {
    let builder = Arc::new(SlowFirstBuilder::default());
    let submitter = Arc::new(RecordingSubmitter::default());
    let f = fixture(Services::default().with_submitter(submitter.clone()), builder.clone());

    let tree = f.tree.clone();
    let function = f.function;
    let submit = tokio::spawn(async move { tree.submit_transaction(function).await });
    builder.entered.notified().await;

    f.surface.set_value(f.amount, "999");
    f.tree.dispatch(f.amount, UiEvent::Mutate).await.unwrap();
    let state = f.tree.workflow_state(f.function).unwrap();
    assert_eq!(state.phase, WorkflowPhase::Submitting);
    assert_eq!(state.last_message, "insufficient funds");
    assert!(f.surface.is_disabled(f.button));

    builder.release.notify_one();
    assert_eq!(
        submit.await.unwrap(),
        Err(WorkflowError::Build(BuildError::new("insufficient funds")))
    );
    assert!(submitter.sent.lock().unwrap().is_empty());
    assert_eq!(builder.calls.load(Ordering::SeqCst), 3);

    let state = f.tree.workflow_state(f.function).unwrap();
    assert_eq!(state.phase, WorkflowPhase::BuildFailed);
    assert_eq!(state.last_message, "insufficient funds");
    assert!(!state.submit_enabled);
    assert!(!state.submit_in_flight);
    assert!(f.surface.is_disabled(f.button));
    assert_eq!(f.tree.info_text(f.function).unwrap(), "insufficient funds");
}

#[tokio::test]
async fn submit_overtaken_by_passing_build_sends_latest_values() {
    let builder = Arc::new(SlowFirstBuilder::default());
    let submitter = Arc::new(RecordingSubmitter::default());
    let f = fixture(Services::default().with_submitter(submitter.clone()), builder.clone());
    f.surface.set_value(f.amount, "999");

    let tree = f.tree.clone();
    let function = f.function;
    let submit = tokio::spawn(async move { tree.send_transaction(function).await });
    builder.entered.notified().await;

    f.surface.set_value(f.amount, "5");
    f.tree.dispatch(f.amount, UiEvent::Mutate).await.unwrap();
    builder.release.notify_one();
    assert_eq!(submit.await.unwrap(), "");

    assert_eq!(
        *submitter.sent.lock().unwrap(),
        vec![(json!({"to": "0xABC", "amount": "5"}), "send".to_string())]
    );
    let state = f.tree.workflow_state(f.function).unwrap();
    assert_eq!(state.phase, WorkflowPhase::Idle);
    assert_eq!(state.last_message, "");
    assert!(state.submit_enabled);
    assert!(!f.surface.is_disabled(f.button));
}
