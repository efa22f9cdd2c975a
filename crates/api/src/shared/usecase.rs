use std::fmt::Debug;
use subtrack_infra::SubtrackContext;
use tracing::{debug, error};

#[async_trait::async_trait(?Send)]
pub trait UseCase: Debug {
    type Response;
    type Error;

    const NAME: &'static str;

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error>;
}

#[tracing::instrument(name = "Executing usecase", skip(usecase, ctx), fields(usecase = U::NAME))]
pub async fn execute<U>(mut usecase: U, ctx: &SubtrackContext) -> Result<U::Response, U::Error>
where
    U: UseCase,
    U::Error: Debug,
{
    debug!("{:?}", usecase);
    let res = usecase.execute(ctx).await;

    if let Err(e) = &res {
        error!("Use case error: {:?}", e);
    }

    res
}
