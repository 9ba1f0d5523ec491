use super::*;
use crate::request::{Handler, Request};
use async_trait::async_trait;
use parking_lot::Mutex;

struct Ping(u32);

impl Request for Ping {
    type Response = u32;
}

struct Doubler;

#[async_trait]
impl Handler<Ping> for Doubler {
    async fn handle(&self, _ctx: &Ctx, req: Ping) -> Result<u32, MediatorError> {
        Ok(req.0 * 2)
    }
}

#[tokio::test]
async fn dispatches_to_registered_handler() {
    let mut mediator = Mediator::new();
    mediator.register::<Ping, _>(Doubler).unwrap();
    let resp = mediator.send(Ctx::root(), Ping(21)).await.unwrap();
    assert_eq!(resp, 42);
}

#[tokio::test]
async fn duplicate_registration_fails() {
    let mut mediator = Mediator::new();
    mediator.register::<Ping, _>(Doubler).unwrap();
    let err = mediator.register::<Ping, _>(Doubler).unwrap_err();
    assert!(matches!(err, MediatorError::DuplicateHandler));
}

#[tokio::test]
async fn missing_handler_fails_with_no_handler() {
    let mediator = Mediator::new();
    let err = mediator.send(Ctx::root(), Ping(1)).await.unwrap_err();
    assert!(matches!(err, MediatorError::NoHandler));
}

struct RecordingMiddleware {
    log: Arc<Mutex<Vec<&'static str>>>,
    tag: &'static str,
}

#[async_trait]
impl Middleware for RecordingMiddleware {
    async fn call(&self, ctx: Ctx, req: ErasedRequest, next: Next<'_>) -> Result<ErasedResponse, MediatorError> {
        self.log.lock().push(self.tag);
        next.run(ctx, req).await
    }
}

#[tokio::test]
async fn middleware_runs_in_registration_order_around_the_handler() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut mediator = Mediator::new();
    mediator.register::<Ping, _>(Doubler).unwrap();
    mediator.use_middleware(RecordingMiddleware { log: log.clone(), tag: "outer" });
    mediator.use_middleware(RecordingMiddleware { log: log.clone(), tag: "inner" });

    mediator.send(Ctx::root(), Ping(1)).await.unwrap();
    assert_eq!(*log.lock(), vec!["outer", "inner"]);
}
