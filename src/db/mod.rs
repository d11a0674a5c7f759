pub mod connector;
pub mod pool;
pub mod todos;

pub use connector::{Connector, DbSettings, PgConnector};
pub use pool::PoolManager;
pub use todos::{PgTodoStore, Todo, TodoStore};
