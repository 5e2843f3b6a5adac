/// A unit of work run by a [`Dispatcher`](crate::Dispatcher).
///
/// Jobs take no arguments and return nothing the scheduler looks at; their
/// effects are whatever they do while running, including submitting more jobs
/// to the dispatcher that runs them.
///
/// Any `FnOnce() + Send + 'static` closure is a job. Types that carry their own
/// state (see [`ExpandJob`](crate::ExpandJob)) implement the trait directly.
///
/// # Example
///
/// ```rust
/// use fff::{Dispatcher, Job};
///
/// struct Greet(&'static str);
///
/// impl Job for Greet {
///     fn run(self: Box<Self>) {
///         println!("hello, {}", self.0);
///     }
/// }
///
/// let dispatcher = Dispatcher::new(2, true).unwrap();
/// dispatcher.submit(Greet("world")).unwrap();
/// dispatcher.submit(|| println!("hello from a closure")).unwrap();
/// dispatcher.drain();
/// ```
pub trait Job: Send + 'static {
    /// Execute the job, consuming it.
    fn run(self: Box<Self>);
}

impl<F> Job for F
where
    F: FnOnce() + Send + 'static,
{
    fn run(self: Box<Self>) {
        (*self)()
    }
}
