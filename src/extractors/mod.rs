// Deterministic extraction from checkout files
//
// Parsers turn manifests, Dockerfiles, compose files, env examples and CI configs
// into typed records. They never guess: malformed content is a ParseError, absent
// files are simply None/empty.

pub mod parsers;
