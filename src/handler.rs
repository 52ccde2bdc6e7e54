//! Defintion and implementations of the [CompletionHandler] trait.

use crate::error::{Failure, Outcome};

/// Represents the capability a command invokes, at most once, with the outcome of its work.
pub trait CompletionHandler<T>: Send + 'static {
    fn on_result(self, value: T);
    fn on_error(self, reason: Failure);

    /// Dispatches the given outcome to the corresponding branch.
    fn complete(self, outcome: Outcome<T>)
    where
        Self: Sized,
    {
        match outcome {
            Ok(value) => self.on_result(value),
            Err(reason) => self.on_error(reason),
        }
    }
}

impl<T, F> CompletionHandler<T> for F
where
    F: FnOnce(Outcome<T>) + Send + 'static,
{
    fn on_result(self, value: T) {
        self(Ok(value))
    }

    fn on_error(self, reason: Failure) {
        self(Err(reason))
    }
}

/// A [`CompletionHandler`] made of one closure per branch.
pub struct Callback<S, F> {
    on_result: S,
    on_error: F,
}

impl<S, F> Callback<S, F> {
    pub fn new(on_result: S, on_error: F) -> Self {
        Self {
            on_result,
            on_error,
        }
    }
}

impl<T, S, F> CompletionHandler<T> for Callback<S, F>
where
    S: FnOnce(T) + Send + 'static,
    F: FnOnce(Failure) + Send + 'static,
{
    fn on_result(self, value: T) {
        (self.on_result)(value)
    }

    fn on_error(self, reason: Failure) {
        (self.on_error)(reason)
    }
}

#[cfg(test)]
pub mod test {
    use super::{Callback, CompletionHandler};
    use crate::error::{Failure, Outcome};
    use std::sync::{Arc, Mutex};

    /// Records every outcome it gets, so tests can tell how many times, and with what, a
    /// handler has been invoked.
    pub struct Recorder<T> {
        pub outcomes: Arc<Mutex<Vec<Outcome<T>>>>,
    }

    impl<T> Default for Recorder<T> {
        fn default() -> Self {
            Self {
                outcomes: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl<T: Send + 'static> Recorder<T> {
        pub fn handler(&self) -> impl CompletionHandler<T> {
            let outcomes = self.outcomes.clone();
            move |outcome: Outcome<T>| outcomes.lock().unwrap().push(outcome)
        }

        pub fn len(&self) -> usize {
            self.outcomes.lock().unwrap().len()
        }

        pub fn take(&self) -> Vec<Outcome<T>> {
            std::mem::take(&mut *self.outcomes.lock().unwrap())
        }
    }

    #[test]
    fn closure_handler_receives_both_branches() {
        let recorder = Recorder::<i32>::default();
        recorder.handler().on_result(42);
        recorder.handler().on_error(Failure::from("network unavailable"));

        let outcomes = recorder.take();
        assert_eq!(outcomes.len(), 2, "unexpected number of outcomes");
        assert!(matches!(outcomes[0], Ok(42)), "got outcome = {:?}", outcomes[0]);
        assert!(
            matches!(&outcomes[1], Err(reason) if reason.to_string() == "network unavailable"),
            "got outcome = {:?}, want failure = network unavailable",
            outcomes[1]
        );
    }

    #[test]
    fn callback_dispatches_to_the_matching_closure() {
        let results = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));

        let new_callback = || {
            let results = results.clone();
            let errors = errors.clone();
            Callback::new(
                move |value: i32| results.lock().unwrap().push(value),
                move |reason: Failure| errors.lock().unwrap().push(reason.to_string()),
            )
        };

        new_callback().complete(Ok::<i32, Failure>(7));
        new_callback().complete(Err::<i32, Failure>("disk full".into()));

        assert_eq!(*results.lock().unwrap(), vec![7]);
        assert_eq!(*errors.lock().unwrap(), vec!["disk full".to_string()]);
    }
}
