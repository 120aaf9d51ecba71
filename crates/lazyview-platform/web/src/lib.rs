//! Browser host for `lazyview-core`.
//!
//! [`WebDocument`] implements the engine's document over `web-sys`,
//! [`WebFetcher`] serves the request based loaders with `window.fetch`, and
//! [`Runtime`] binds window events and pumps them into a [`Driven`] engine.
//!
//! ```ignore
//! let window = web_sys::window().unwrap();
//! let queue = EventQueue::new();
//! let doc = WebDocument::new(window.clone(), queue.clone())?;
//! let items = doc.query_all(".lazy");
//! let mut loader = LazyLoader::builder(config)
//!     .readiness(readiness(&window))
//!     .build(doc, items);
//! loader.set_settle_waker(queue.notifier(HostEvent::Settled));
//! Runtime::start(window, Rc::new(RefCell::new(loader)), queue, SystemClock::new(), options)
//!     .keep_alive();
//! ```
//!
//! [`Driven`]: lazyview_core::Driven

mod document;
mod events;
mod fetch;
mod runtime;

pub use document::WebDocument;
pub use events::{EventQueue, HostEvent};
pub use fetch::WebFetcher;
pub use runtime::{readiness, Runtime, RuntimeOptions};
