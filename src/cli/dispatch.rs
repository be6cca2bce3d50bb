//! Command handlers: the deferred-initialization gate and dispatch
//!
//! Every mutating command runs the same one-shot sequence: the request is
//! built from flags by the router, [`Context::prepare`] resolves the
//! environment, the positional specifier is parsed into the request, and
//! only then is the finished request handed to the operation. Preparation
//! failure stops the sequence before the specifier is even looked at;
//! a missing required id stops it after parsing with a single diagnostic
//! and no operation call. There is no retry path anywhere - every failure
//! is terminal for the invocation.

use anyhow::Result;

use super::output::Output;
use crate::domain::{Request, Specifier};
use crate::ops::Ops;
use crate::storage::Context;

/// `install [specifier]` - URL and file sources are permitted.
pub fn install(
    ops: &dyn Ops,
    output: &Output,
    mut request: Request,
    token: Option<&str>,
) -> Result<()> {
    let context = Context::prepare(&request)?;

    request.apply_specifier(Specifier::parse(token, true));
    output.verbose_ctx("install", &format!("dispatching {:?}", request));

    ops.install(&context, &request)?;
    Ok(())
}

/// `update` - an install run over everything already installed, with no
/// positional specifier by construction.
pub fn update(ops: &dyn Ops, output: &Output, mut request: Request) -> Result<()> {
    request.update = true;

    let context = Context::prepare(&request)?;
    output.verbose_ctx("update", &format!("dispatching {:?}", request));

    ops.install(&context, &request)?;
    Ok(())
}

/// `uninstall <specifier>` - identifier specifiers only.
pub fn uninstall(
    ops: &dyn Ops,
    output: &Output,
    mut request: Request,
    token: Option<&str>,
) -> Result<()> {
    let context = Context::prepare(&request)?;

    request.apply_specifier(Specifier::parse(token, false));
    if request.id.is_none() {
        output.error("missing <id>");
        return Ok(());
    }

    ops.uninstall(&context, &request)?;
    Ok(())
}

/// `demo <specifier>` - identifier specifiers only; the router has already
/// pinned the request to the global store.
pub fn demo(
    ops: &dyn Ops,
    output: &Output,
    mut request: Request,
    token: Option<&str>,
) -> Result<()> {
    let context = Context::prepare(&request)?;

    request.apply_specifier(Specifier::parse(token, false));
    if request.id.is_none() {
        output.error("missing <id>");
        return Ok(());
    }

    ops.demo(&context, &request)?;
    Ok(())
}

/// `info <id>` - dispatches directly, without the initialization gate.
pub fn info(ops: &dyn Ops, output: &Output, request: Request) -> Result<()> {
    output.verbose_ctx("info", &format!("dispatching {:?}", request));

    ops.info(&request)?;
    Ok(())
}
