mod persistence;
mod resolver;
mod scenario;
