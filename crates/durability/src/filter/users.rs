//! Placeholder for the user credential file

/// A stock `conf/users.auth.php` with the header comments and no users
pub const EMPTY_USERS_AUTH: &[u8] = b"# users.auth.php
# <?php exit()?>
# Don't modify the lines above
#
# Userfile
#
# Format:
#
# login:passwordhash:Real Name:email:groups,comma,separated
";
