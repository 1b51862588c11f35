mod testcases;
mod test_from_yaml;
