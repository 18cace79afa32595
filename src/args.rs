//! Call-argument surface for wrapped spider steps.
//!
//! The coordinator wraps caller-supplied steps that, in the engine's calling
//! convention, receive a mix of positional and keyword arguments. The
//! coordinator must locate "the" driving response among them, so the wrapped
//! call surface keeps that shape explicit: [`CallArgs`] carries positional
//! arguments in order and keyword arguments in insertion order, and each
//! argument is either a response or an opaque value.

use crate::response::Response;

/// A single argument passed to a wrapped step.
#[derive(Debug, Clone)]
pub enum CallArg {
    /// A response-typed argument, a candidate driving response.
    Response(Response),
    /// Any other argument; opaque to the coordinator.
    Value(serde_json::Value),
}

impl From<Response> for CallArg {
    fn from(response: Response) -> Self {
        CallArg::Response(response)
    }
}

impl From<serde_json::Value> for CallArg {
    fn from(value: serde_json::Value) -> Self {
        CallArg::Value(value)
    }
}

/// The argument list of one wrapped-step invocation.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    positional: Vec<CallArg>,
    keyword: Vec<(String, CallArg)>,
}

impl CallArgs {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an argument list with `response` as the only positional argument.
    pub fn from_response(response: Response) -> Self {
        let mut args = Self::new();
        args.push(response);
        args
    }

    /// Appends a positional argument.
    pub fn push(&mut self, arg: impl Into<CallArg>) -> &mut Self {
        self.positional.push(arg.into());
        self
    }

    /// Appends a keyword argument.
    pub fn push_keyword(&mut self, name: impl Into<String>, arg: impl Into<CallArg>) -> &mut Self {
        self.keyword.push((name.into(), arg.into()));
        self
    }

    /// Iterates all response-typed arguments, positional first, then keyword,
    /// both in insertion order.
    pub fn responses(&self) -> impl Iterator<Item = &Response> {
        self.positional
            .iter()
            .chain(self.keyword.iter().map(|(_, arg)| arg))
            .filter_map(|arg| match arg {
                CallArg::Response(response) => Some(response),
                CallArg::Value(_) => None,
            })
    }

    /// Number of response-typed arguments present.
    pub fn response_count(&self) -> usize {
        self.responses().count()
    }

    /// Mutable access to the first response-typed argument, if any.
    pub fn first_response_mut(&mut self) -> Option<&mut Response> {
        self.positional
            .iter_mut()
            .chain(self.keyword.iter_mut().map(|(_, arg)| arg))
            .find_map(|arg| match arg {
                CallArg::Response(response) => Some(response),
                CallArg::Value(_) => None,
            })
    }

    /// Shared access to the first response-typed argument, if any.
    pub fn first_response(&self) -> Option<&Response> {
        self.responses().next()
    }
}
