mod dns;
mod interception;

pub use dns::DnsServices;
pub use interception::InterceptionServices;
