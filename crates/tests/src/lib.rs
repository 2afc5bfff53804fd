
#[cfg(test)]
mod assignment_flow_tests;

#[cfg(test)]
mod grade_entry_tests;

#[cfg(test)]
mod stats_cache_tests;

#[cfg(test)]
mod auth_tests;

#[cfg(test)]
mod http_tests;


#[cfg(test)]
mod realtime_tests;

#[cfg(test)]
mod admin_tests;

#[cfg(test)]
mod student_tests;
