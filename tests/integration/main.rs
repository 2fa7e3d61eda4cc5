mod helpers;
mod test_paginate;
