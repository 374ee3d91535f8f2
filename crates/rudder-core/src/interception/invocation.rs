//! Reified method invocations

use rudder_domain::types::{ArgumentList, MethodSignature, ReturnValue};

/// One intercepted method call: the invoked signature, its arguments and
/// the return value as it stands after base call and handlers.
pub struct MethodInvocation {
    method: MethodSignature,
    arguments: ArgumentList,
    return_value: ReturnValue,
}

impl MethodInvocation {
    /// Reify an invocation with a void return value
    pub fn new(method: MethodSignature, arguments: ArgumentList) -> Self {
        Self {
            method,
            arguments,
            return_value: ReturnValue::void(),
        }
    }

    /// The invoked method's signature
    pub fn method(&self) -> &MethodSignature {
        &self.method
    }

    /// The invocation arguments
    pub fn arguments(&self) -> &ArgumentList {
        &self.arguments
    }

    /// Mutable access to the invocation arguments.
    ///
    /// Handlers see mutations made by earlier handlers in the chain.
    pub fn arguments_mut(&mut self) -> &mut ArgumentList {
        &mut self.arguments
    }

    /// The current return value
    pub fn return_value(&self) -> &ReturnValue {
        &self.return_value
    }

    /// Overwrite the return value
    pub fn set_return_value(&mut self, value: ReturnValue) {
        self.return_value = value;
    }

    /// Consume the invocation, yielding the final return value
    pub fn into_return_value(self) -> ReturnValue {
        self.return_value
    }
}

impl std::fmt::Debug for MethodInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodInvocation")
            .field("method", &self.method.name)
            .field("arguments", &self.arguments.len())
            .field("void", &self.return_value.is_void())
            .finish()
    }
}
