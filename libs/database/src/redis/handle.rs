use redis::aio::{ConnectionLike, ConnectionManager};
use redis::cluster_async::ClusterConnection;
use redis::{Cmd, Pipeline, RedisFuture, Value};

/// The one backing-store connection shared by every request task.
///
/// Both variants multiplex over a single socket (per node) and are cheap to
/// clone. Commands are routed through [`ConnectionLike`], so callers use the
/// usual `redis::cmd(..).query_async(&mut handle)` regardless of topology.
#[derive(Clone)]
pub enum RedisHandle {
    Single(ConnectionManager),
    Cluster(ClusterConnection),
}

impl RedisHandle {
    pub fn is_cluster(&self) -> bool {
        matches!(self, RedisHandle::Cluster(_))
    }
}

impl std::fmt::Debug for RedisHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedisHandle::Single(_) => f.write_str("RedisHandle::Single"),
            RedisHandle::Cluster(_) => f.write_str("RedisHandle::Cluster"),
        }
    }
}

impl From<ConnectionManager> for RedisHandle {
    fn from(manager: ConnectionManager) -> Self {
        RedisHandle::Single(manager)
    }
}

impl From<ClusterConnection> for RedisHandle {
    fn from(connection: ClusterConnection) -> Self {
        RedisHandle::Cluster(connection)
    }
}

impl ConnectionLike for RedisHandle {
    fn req_packed_command<'a>(&'a mut self, cmd: &'a Cmd) -> RedisFuture<'a, Value> {
        match self {
            RedisHandle::Single(conn) => conn.req_packed_command(cmd),
            RedisHandle::Cluster(conn) => conn.req_packed_command(cmd),
        }
    }

    fn req_packed_commands<'a>(
        &'a mut self,
        cmd: &'a Pipeline,
        offset: usize,
        count: usize,
    ) -> RedisFuture<'a, Vec<Value>> {
        match self {
            RedisHandle::Single(conn) => conn.req_packed_commands(cmd, offset, count),
            RedisHandle::Cluster(conn) => conn.req_packed_commands(cmd, offset, count),
        }
    }

    fn get_db(&self) -> i64 {
        match self {
            RedisHandle::Single(conn) => conn.get_db(),
            RedisHandle::Cluster(conn) => conn.get_db(),
        }
    }
}
