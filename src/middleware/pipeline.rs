//! Continuation chain driving middleware and the controller.
//!
//! # Ordering
//! ```text
//! global [G1, G2] + route [R1, R2]:
//!     before next():  G1 → G2 → R1 → R2 → controller
//!     after next():   R2 → R1 → G2 → G1
//! ```

use crate::controller::Controller;
use crate::http::{Request, Response};
use crate::kernel::{AppContext, Registry};
use crate::middleware::{DispatchError, MiddlewareSpec};

/// The specs still to run: global ones first, then the route's own.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chain<'a> {
    global: &'a [MiddlewareSpec],
    route: &'a [MiddlewareSpec],
}

impl<'a> Chain<'a> {
    pub fn new(global: &'a [MiddlewareSpec], route: &'a [MiddlewareSpec]) -> Self {
        Self { global, route }
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.route.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn split_first(self) -> Option<(&'a MiddlewareSpec, Chain<'a>)> {
        if let Some((first, rest)) = self.global.split_first() {
            return Some((first, Chain::new(rest, self.route)));
        }
        self.route
            .split_first()
            .map(|(first, rest)| (first, Chain::new(&[], rest)))
    }
}

/// The remainder of the chain, handed to each middleware.
///
/// Consumed by [`Next::run`]; a middleware that never calls it short-circuits
/// the chain and the controller is never executed.
pub struct Next<'a> {
    chain: Chain<'a>,
    registry: &'a Registry,
    ctx: &'a AppContext,
    controller: Box<dyn Controller>,
}

impl<'a> Next<'a> {
    /// Run the rest of the chain and return its response.
    pub async fn run(self, request: Request, response: Response) -> Result<Response, DispatchError> {
        let Next {
            chain,
            registry,
            ctx,
            mut controller,
        } = self;

        match chain.split_first() {
            None => Ok(controller.execute(request, response).await),
            Some((spec, rest)) => {
                let middleware = registry.build_middleware(spec)?;
                tracing::trace!(middleware = %spec.name, remaining = rest.len(), "Entering middleware");
                let next = Next {
                    chain: rest,
                    registry,
                    ctx,
                    controller,
                };
                middleware.process(request, response, ctx, next).await
            }
        }
    }

    /// Number of middleware still ahead of the controller.
    pub fn remaining(&self) -> usize {
        self.chain.len()
    }
}

/// Executes a controller behind an ordered middleware chain.
pub struct MiddlewarePipeline<'a> {
    registry: &'a Registry,
    ctx: &'a AppContext,
}

impl<'a> MiddlewarePipeline<'a> {
    pub fn new(registry: &'a Registry, ctx: &'a AppContext) -> Self {
        Self { registry, ctx }
    }

    /// Run `controller` behind `chain`. An empty chain calls the controller
    /// directly and builds no middleware.
    pub async fn execute(
        &self,
        request: Request,
        response: Response,
        controller: Box<dyn Controller>,
        chain: Chain<'a>,
    ) -> Result<Response, DispatchError> {
        Next {
            chain,
            registry: self.registry,
            ctx: self.ctx,
            controller,
        }
        .run(request, response)
        .await
    }
}
