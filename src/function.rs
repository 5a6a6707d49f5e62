use std::cell::RefCell;
use std::rc::Rc;

use crate::class::LoxInstance;
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::interpreter::{Interpreter, Signal};
use crate::stmt::FunctionDecl;
use crate::value::Value;

/// A user-declared function or method: the shared declaration plus the
/// environment captured at the definition site.
#[derive(Debug, Clone)]
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        LoxFunction {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// A copy of this function whose closure is extended with a `this`
    /// binding to the receiver.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance>>) -> LoxFunction {
        let mut env = Environment::with_enclosing(self.closure.clone());
        env.define("this", Value::Instance(instance));
        LoxFunction {
            declaration: self.declaration.clone(),
            closure: Rc::new(RefCell::new(env)),
            is_initializer: self.is_initializer,
        }
    }

    pub fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        let mut env = Environment::with_enclosing(self.closure.clone());
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            env.define(&param.lexeme, argument);
        }

        let signal = interpreter.execute_block(&self.declaration.body, Rc::new(RefCell::new(env)))?;

        // An initializer always yields the receiver, even on bare `return;`.
        if self.is_initializer {
            return self.bound_this();
        }

        match signal {
            Signal::Return(value) => Ok(value),
            Signal::Normal => Ok(Value::Nil),
        }
    }

    fn bound_this(&self) -> Result<Value> {
        self.closure.borrow().get_at(0, "this").ok_or_else(|| {
            LoxError::runtime(
                self.declaration.name.line,
                "Initializer lost its 'this' binding.",
            )
        })
    }
}

/// A host-provided builtin. The hook closes over whatever the host injected,
/// e.g. the time provider behind `clock`.
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: Rc<dyn Fn(&[Value]) -> std::result::Result<Value, String>>,
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}
